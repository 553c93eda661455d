use serde::{Deserialize, Serialize};

/// Query-side analyzer configuration
///
/// Should mirror the analysis rules the engine applied at index time,
/// otherwise managed queries will miss terms.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: true,
            stem: false,
            min_token_length: 2,
            max_token_length: 50,
        }
    }
}

/// Default maximum number of results an execution takes
pub const DEFAULT_MAX_RESULTS: usize = 500;

/// Result-shaping options handed to the execution engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Number of leading results to skip
    pub skip: usize,
    /// Maximum number of results to return
    pub take: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            skip: 0,
            take: DEFAULT_MAX_RESULTS,
        }
    }
}

impl QueryOptions {
    pub fn new(skip: usize, take: usize) -> Self {
        Self { skip, take }
    }

    /// Options taking the first `take` results
    pub fn take(take: usize) -> Self {
        Self { skip: 0, take }
    }
}
