//! Status service - portfolio and price table summary

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::money::format_usd;
use crate::domain::PortfolioStats;
use crate::ports::PriceTable;
use crate::services::PortfolioService;

pub struct StatusService {
    portfolio: Arc<PortfolioService>,
    prices: Arc<dyn PriceTable>,
}

impl StatusService {
    pub fn new(portfolio: Arc<PortfolioService>, prices: Arc<dyn PriceTable>) -> Self {
        Self { portfolio, prices }
    }

    /// Overall status for a user's portfolio
    pub fn get_status(&self, user_id: &str) -> Result<StatusSummary> {
        self.get_status_at(user_id, Utc::now())
    }

    /// Status with expiry counts taken relative to `now`
    pub fn get_status_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<StatusSummary> {
        let stats = self.portfolio.compute_user_stats_at(user_id, now)?;
        let view = self.portfolio.compute_user_domain_view(user_id)?;
        let prices = self.prices.get_registrar_prices()?;

        let mut by_registrar: BTreeMap<String, usize> = BTreeMap::new();
        for d in &view {
            *by_registrar.entry(d.domain.registrar.clone()).or_default() += 1;
        }

        let mut priced_tlds: Vec<String> = prices.iter().map(|p| p.tld.clone()).collect();
        priced_tlds.sort();
        priced_tlds.dedup();

        Ok(StatusSummary {
            user_id: user_id.to_string(),
            total_savings_display: format_usd(stats.total_savings),
            stats,
            registrars: by_registrar
                .into_iter()
                .map(|(name, domains)| RegistrarSummary { name, domains })
                .collect(),
            price_entries: prices.len(),
            priced_tlds,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub user_id: String,
    #[serde(flatten)]
    pub stats: PortfolioStats,
    pub total_savings_display: String,
    pub registrars: Vec<RegistrarSummary>,
    pub price_entries: usize,
    pub priced_tlds: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistrarSummary {
    pub name: String,
    pub domains: usize,
}
