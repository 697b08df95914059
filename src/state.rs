use std::sync::Arc;

use serde_json::Value;

use crate::cache::{fingerprint, AggregationCache, TransactionSlot};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::filters::filter_by_category;
use crate::models::{AggregationResult, CategorySummary, NormalizedTransaction};
use crate::observability::{events, Observer, TracingObserver};
use crate::services::analytics::aggregate_by_category;
use crate::services::normalizer::normalize_transactions;
use crate::services::weekly::bucketize;

/// One logical aggregation session, e.g. one dashboard widget.
///
/// The session owns its cache, so results never leak between unrelated
/// sessions. Every derivation is a pure function of its inputs; a cached
/// result is returned while the inputs fingerprint the same and the cache has
/// not been invalidated. Failed derivations are reported to the observer and
/// replaced by their empty default, never cached and never returned as errors.
pub struct AggregationSession {
    config: EngineConfig,
    cache: AggregationCache,
    observer: Arc<dyn Observer>,
}

impl AggregationSession {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    pub fn with_observer(config: EngineConfig, observer: Arc<dyn Observer>) -> Self {
        Self {
            config,
            cache: AggregationCache::new(),
            observer,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &AggregationCache {
        &self.cache
    }

    /// Drop every cached result, e.g. after the input feed reports new data.
    pub fn invalidate(&self) {
        self.cache.invalidate();
        self.observer.record(
            events::CACHE_INVALIDATED,
            &[("generation", self.cache.generation().to_string())],
        );
    }

    /// Normalized form of the actual-transaction feed.
    pub fn normalized(&self, raw: &Value) -> Arc<Vec<NormalizedTransaction>> {
        self.normalized_in(TransactionSlot::Normalized, raw, fingerprint(raw))
    }

    /// Normalized form of the projected-transaction feed.
    pub fn projected(&self, raw: &Value) -> Arc<Vec<NormalizedTransaction>> {
        self.normalized_in(TransactionSlot::Projected, raw, fingerprint(raw))
    }

    /// Normalized actual transactions restricted to `category`.
    ///
    /// Without a category this is the very same `Arc` as [`Self::normalized`].
    pub fn filtered(
        &self,
        raw: &Value,
        category: Option<&str>,
    ) -> Arc<Vec<NormalizedTransaction>> {
        let raw_fp = fingerprint(raw);
        let normalized = self.normalized_in(TransactionSlot::Normalized, raw, raw_fp);
        self.filtered_from(normalized, raw_fp, category)
    }

    /// Weekly time series, total and weekly average for the filtered set.
    pub fn weekly(&self, raw: &Value, category: Option<&str>) -> Arc<AggregationResult> {
        let raw_fp = fingerprint(raw);
        let key = self
            .cache
            .key(fingerprint(&(raw_fp, category, self.config)));
        if let Some(hit) = self.cache.get_weekly(key) {
            self.record_cache(events::CACHE_HIT, "weekly");
            return hit;
        }
        self.record_cache(events::CACHE_MISS, "weekly");

        let normalized = self.normalized_in(TransactionSlot::Normalized, raw, raw_fp);
        let filtered = self.filtered_from(normalized, raw_fp, category);

        match bucketize(&filtered, &self.config) {
            Ok(result) => {
                self.observer.record(
                    events::BUCKETIZED,
                    &[
                        ("weeks", result.weeks.len().to_string()),
                        ("total", result.total.to_string()),
                        ("weekly_average", result.weekly_average.to_string()),
                    ],
                );
                let result = Arc::new(result);
                self.cache.set_weekly(key, Arc::clone(&result));
                result
            }
            Err(err) => {
                self.report_fault("weekly", &err);
                Arc::new(AggregationResult::default())
            }
        }
    }

    /// Category breakdown of actual against projected spending.
    ///
    /// When `category` is given both feeds are restricted to it first, so the
    /// breakdown covers exactly the set [`Self::weekly`] buckets.
    pub fn categories(
        &self,
        raw: &Value,
        projected: &Value,
        category: Option<&str>,
    ) -> Arc<CategorySummary> {
        let raw_fp = fingerprint(raw);
        let projected_fp = fingerprint(projected);
        let key = self
            .cache
            .key(fingerprint(&(raw_fp, projected_fp, category)));
        if let Some(hit) = self.cache.get_categories(key) {
            self.record_cache(events::CACHE_HIT, "categories");
            return hit;
        }
        self.record_cache(events::CACHE_MISS, "categories");

        let actual = self.normalized_in(TransactionSlot::Normalized, raw, raw_fp);
        let actual = self.filtered_from(actual, raw_fp, category);
        let forecast = self.normalized_in(TransactionSlot::Projected, projected, projected_fp);
        let forecast = match category {
            Some(name) => Arc::new(filter_by_category(&forecast, Some(name)).into_owned()),
            None => forecast,
        };

        match aggregate_by_category(&actual, &forecast) {
            Ok(summary) => {
                self.observer.record(
                    events::CATEGORIES_AGGREGATED,
                    &[
                        ("categories", summary.rows.len().to_string()),
                        ("total_sum", summary.total_sum.to_string()),
                    ],
                );
                let summary = Arc::new(summary);
                self.cache.set_categories(key, Arc::clone(&summary));
                summary
            }
            Err(err) => {
                self.report_fault("categories", &err);
                Arc::new(CategorySummary::default())
            }
        }
    }

    fn normalized_in(
        &self,
        slot: TransactionSlot,
        raw: &Value,
        raw_fp: u64,
    ) -> Arc<Vec<NormalizedTransaction>> {
        let key = self.cache.key(raw_fp);
        if let Some(hit) = self.cache.get_transactions(slot, key) {
            self.record_cache(events::CACHE_HIT, slot.as_str());
            return hit;
        }
        self.record_cache(events::CACHE_MISS, slot.as_str());

        let normalized = normalize_transactions(raw);
        let input_len = raw.as_array().map_or(0, Vec::len);
        self.observer.record(
            events::NORMALIZED,
            &[
                ("slot", slot.as_str().to_string()),
                ("kept", normalized.len().to_string()),
                ("dropped", (input_len - normalized.len()).to_string()),
            ],
        );

        let normalized = Arc::new(normalized);
        self.cache.set_transactions(slot, key, Arc::clone(&normalized));
        normalized
    }

    fn filtered_from(
        &self,
        normalized: Arc<Vec<NormalizedTransaction>>,
        raw_fp: u64,
        category: Option<&str>,
    ) -> Arc<Vec<NormalizedTransaction>> {
        let Some(name) = category else {
            return normalized;
        };
        let slot = TransactionSlot::Filtered;

        let key = self.cache.key(fingerprint(&(raw_fp, name)));
        if let Some(hit) = self.cache.get_transactions(slot, key) {
            self.record_cache(events::CACHE_HIT, slot.as_str());
            return hit;
        }
        self.record_cache(events::CACHE_MISS, slot.as_str());

        let filtered = Arc::new(filter_by_category(&normalized, Some(name)).into_owned());
        self.cache.set_transactions(slot, key, Arc::clone(&filtered));
        filtered
    }

    fn record_cache(&self, event: &str, slot: &str) {
        self.observer.record(event, &[("slot", slot.to_string())]);
    }

    fn report_fault(&self, stage: &str, err: &EngineError) {
        self.observer.record(
            events::FAULT,
            &[
                ("stage", stage.to_string()),
                ("kind", err.kind().to_string()),
                ("error", err.to_string()),
            ],
        );
    }
}
