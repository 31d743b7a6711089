//! Portfolio service - joins the domain store with the price table
//!
//! Every call reads a fresh snapshot from the stores; nothing is cached
//! between calls.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::domain::{
    aggregate, compare_domain, summarize_savings, DomainWithComparison, PortfolioStats,
    RegistrarPrice, SavingsSummary,
};
use crate::ports::{DomainStore, PriceTable};

pub struct PortfolioService {
    domains: Arc<dyn DomainStore>,
    prices: Arc<dyn PriceTable>,
}

impl PortfolioService {
    pub fn new(domains: Arc<dyn DomainStore>, prices: Arc<dyn PriceTable>) -> Self {
        Self { domains, prices }
    }

    /// The user's domains, each compared against the prices for its TLD
    ///
    /// Prices are fetched once per distinct TLD. Order follows the store
    /// (creation order).
    pub fn compute_user_domain_view(&self, user_id: &str) -> Result<Vec<DomainWithComparison>> {
        let domains = self
            .domains
            .get_user_domains(user_id)
            .context("Failed to load domains")?;

        let mut prices_by_tld: HashMap<String, Vec<RegistrarPrice>> = HashMap::new();
        let mut view = Vec::with_capacity(domains.len());

        for domain in domains {
            if !prices_by_tld.contains_key(&domain.tld) {
                let prices = self
                    .prices
                    .get_prices_for_tld(&domain.tld)
                    .with_context(|| format!("Failed to load prices for {}", domain.tld))?;
                prices_by_tld.insert(domain.tld.clone(), prices);
            }
            let matching = prices_by_tld
                .get(&domain.tld)
                .map(Vec::as_slice)
                .unwrap_or_default();
            view.push(compare_domain(domain, matching));
        }

        Ok(view)
    }

    /// Portfolio statistics as of now
    pub fn compute_user_stats(&self, user_id: &str) -> Result<PortfolioStats> {
        let now = Utc::now();
        self.compute_user_stats_at(user_id, now)
    }

    /// Portfolio statistics relative to a fixed reference time
    pub fn compute_user_stats_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<PortfolioStats> {
        let view = self.compute_user_domain_view(user_id)?;
        Ok(aggregate(&view, now))
    }

    /// Transfer opportunities, largest savings first
    pub fn savings_summary(&self, user_id: &str) -> Result<SavingsSummary> {
        let now = Utc::now();
        self.savings_summary_at(user_id, now)
    }

    pub fn savings_summary_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<SavingsSummary> {
        let view = self.compute_user_domain_view(user_id)?;
        Ok(summarize_savings(&view, now))
    }

    /// Domain view filtered by a case-insensitive substring of the full name
    /// or registrar
    pub fn search(&self, user_id: &str, query: Option<&str>) -> Result<Vec<DomainWithComparison>> {
        let view = self.compute_user_domain_view(user_id)?;
        let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            return Ok(view);
        };

        let needle = query.to_lowercase();
        Ok(view
            .into_iter()
            .filter(|d| {
                d.domain.full_name().to_lowercase().contains(&needle)
                    || d.domain.registrar.to_lowercase().contains(&needle)
            })
            .collect())
    }
}
