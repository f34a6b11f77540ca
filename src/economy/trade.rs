//! Selling artifacts back to the void market.
//!
//! A sale is two steps so the caller can show the offer before committing:
//! [`quote_sale`] prices each artifact once, [`execute_sale`] removes exactly the quoted
//! artifacts and pays exactly the quoted amounts.

use super::market::ArtifactMarket;
use super::player::Player;
use log::info;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    pub id: String,
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleQuote {
    pub lines: Vec<SaleLine>,
}

impl SaleQuote {
    pub fn total(&self) -> u64 {
        self.lines.iter().map(|l| l.value).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleReceipt {
    pub sold: Vec<SaleLine>,
    pub total: u64,
}

/// Price the listed artifacts at current market value. Unknown and repeated ids are skipped.
pub fn quote_sale(player: &Player, market: &ArtifactMarket, ids: &[String]) -> SaleQuote {
    let mut seen = HashSet::new();
    let lines = ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| player.get(id))
        .map(|artifact| SaleLine {
            id: artifact.id.clone(),
            name: artifact.name.clone(),
            value: market.value_of(artifact),
        })
        .collect();
    SaleQuote { lines }
}

/// Complete a quoted sale. Lines whose artifact has left the collection since quoting are
/// dropped from the receipt and not paid.
pub fn execute_sale(player: &mut Player, quote: SaleQuote) -> SaleReceipt {
    let sold: Vec<SaleLine> = quote
        .lines
        .into_iter()
        .filter(|line| player.remove(&line.id).is_some())
        .collect();
    let total = sold.iter().map(|l| l.value).sum();
    player.earn(total);
    player.record_sold(sold.len() as u64);
    info!("sold {} artifact(s) for {} credits", sold.len(), total);
    SaleReceipt { sold, total }
}
