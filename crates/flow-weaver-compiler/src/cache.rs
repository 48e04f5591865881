//! Session-scoped ownership of the import-resolution cache (`spec.md §5`:
//! "the cache is process-wide but logically scoped to one compiling
//! session; a fresh `Compiler` gets a fresh cache"). Wraps
//! `flow_weaver_parser::ImportCache` with hit/miss counters mirroring the
//! teacher's `DemandEngine::cache_stats()`.

use std::sync::atomic::{AtomicUsize, Ordering};

use flow_weaver_parser::{ImportCache, ParsedModule};

/// Point-in-time snapshot of cache effectiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl CacheStats {
    pub fn accesses(&self) -> usize {
        self.hits + self.misses
    }
}

/// Owns the module cache for the lifetime of one `Compiler`. Every
/// `compile()` call shares it; `clear()` drops everything, e.g. when a
/// caller knows every watched file changed on disk.
pub struct ModuleCache {
    inner: ImportCache<ParsedModule>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ModuleCache {
    pub fn new(capacity: usize) -> Self {
        Self { inner: ImportCache::new(capacity), hits: AtomicUsize::new(0), misses: AtomicUsize::new(0) }
    }

    pub fn inner(&self) -> &ImportCache<ParsedModule> {
        &self.inner
    }

    /// Parses via `parse_fn` only on a cache miss, incrementing the
    /// matching counter. `ImportCache` itself doesn't report which path was
    /// taken, so the miss counter is driven by whether `parse_fn` actually
    /// ran.
    pub fn get_or_parse(
        &self,
        path: &std::path::Path,
        parse_fn: impl FnOnce(&str) -> flow_weaver_parser::Result<ParsedModule>,
    ) -> flow_weaver_parser::Result<ParsedModule> {
        let mut missed = false;
        let result = self.inner.get_or_parse(path, |content| {
            missed = true;
            parse_fn(content)
        });
        if missed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.inner.len(),
        }
    }

    pub fn clear(&self) {
        self.inner.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_parse_of_unchanged_file_is_a_hit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "export const x = 1;").unwrap();
        let cache = ModuleCache::new(8);

        cache.get_or_parse(&path, |_| Ok(ParsedModule::default())).unwrap();
        cache.get_or_parse(&path, |_| Ok(ParsedModule::default())).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }
}
