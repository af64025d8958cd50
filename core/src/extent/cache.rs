//! Session cache for built function proxies.
//!
//! Each (source file, function) pair is parsed and walked once per session.
//! The resulting proxy is immutable and shared read-only with every patch
//! analysed against it.

use super::{ExtentBuilder, FunctionProxy};
use crate::error::AnalysisError;
use crate::syntax::c::CFrontend;
use crate::syntax::SyntaxFrontend;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type CacheKey = (PathBuf, String);

pub struct ProxyCache<F = CFrontend> {
    builder: ExtentBuilder<F>,
    entries: HashMap<CacheKey, Arc<FunctionProxy>>,
}

impl<F: SyntaxFrontend> ProxyCache<F> {
    pub fn new(builder: ExtentBuilder<F>) -> Self {
        Self {
            builder,
            entries: HashMap::new(),
        }
    }

    /// Return the cached proxy for this pair, building it on first use.
    ///
    /// Failures are not cached.
    pub fn get_or_build(
        &mut self,
        source_file: &Path,
        function_name: &str,
        include_dirs: &[PathBuf],
    ) -> Result<Arc<FunctionProxy>, AnalysisError> {
        let key = (source_file.to_path_buf(), function_name.trim().to_owned());
        if let Some(proxy) = self.entries.get(&key) {
            log::debug!(
                "[cache] hit for '{}' in {}",
                key.1,
                source_file.display()
            );
            return Ok(Arc::clone(proxy));
        }

        let proxy = Arc::new(
            self.builder
                .build(source_file, function_name, include_dirs)?,
        );
        self.entries.insert(key, Arc::clone(&proxy));
        Ok(proxy)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
