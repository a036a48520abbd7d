//! The validated, immutable document model.

use std::collections::HashMap;

use crate::{AssetDefinition, PlanDefinition, PortfolioDefinition, Record, Symbol};

/// A validated document: definitions and records with lookup indexes.
///
/// A `Model` is produced once by resolution and never mutated afterwards.
/// All query surfaces read it without locking; evaluation produces fresh,
/// independently owned results. Definitions and records keep their source
/// order, so two resolutions of the same text yield structurally identical
/// models.
#[derive(Debug, Clone, Default)]
pub struct Model {
    assets: Vec<AssetDefinition>,
    asset_index: HashMap<Symbol, usize>,
    portfolios: Vec<PortfolioDefinition>,
    portfolio_index: HashMap<String, usize>,
    plans: Vec<PlanDefinition>,
    plan_index: HashMap<String, usize>,
    records: Vec<Record>,
}

impl Model {
    /// Assemble a model from already-validated parts.
    ///
    /// Callers must have rejected duplicate symbols and names beforehand;
    /// on duplicates the later entry silently wins in the index, which is
    /// why resolution treats them as errors first.
    pub fn from_parts(
        assets: Vec<AssetDefinition>,
        portfolios: Vec<PortfolioDefinition>,
        plans: Vec<PlanDefinition>,
        records: Vec<Record>,
    ) -> Self {
        let asset_index = assets
            .iter()
            .enumerate()
            .map(|(i, a)| (a.symbol.clone(), i))
            .collect();
        let portfolio_index = portfolios
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        let plan_index = plans
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        Self {
            assets,
            asset_index,
            portfolios,
            portfolio_index,
            plans,
            plan_index,
            records,
        }
    }

    /// All asset definitions, in source order.
    pub fn assets(&self) -> &[AssetDefinition] {
        &self.assets
    }

    /// Look up the definition for a symbol, if one exists.
    pub fn asset(&self, symbol: &Symbol) -> Option<&AssetDefinition> {
        self.asset_index.get(symbol).map(|&i| &self.assets[i])
    }

    /// All portfolio definitions, in source order.
    pub fn portfolios(&self) -> &[PortfolioDefinition] {
        &self.portfolios
    }

    /// Look up a portfolio by name.
    pub fn portfolio(&self, name: &str) -> Option<&PortfolioDefinition> {
        self.portfolio_index
            .get(name)
            .map(|&i| &self.portfolios[i])
    }

    /// All plan definitions, in source order.
    pub fn plans(&self) -> &[PlanDefinition] {
        &self.plans
    }

    /// Look up a plan by name.
    pub fn plan(&self, name: &str) -> Option<&PlanDefinition> {
        self.plan_index.get(name).map(|&i| &self.plans[i])
    }

    /// All records, in source order.
    ///
    /// The index of a record in this slice is its source sequence number,
    /// which the evaluator uses as the final tie-breaker when merging.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records referring to one symbol, in source order with their
    /// sequence numbers.
    pub fn records_for<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> impl Iterator<Item = (usize, &'a Record)> + 'a {
        self.records
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.symbol() == symbol)
    }
}
