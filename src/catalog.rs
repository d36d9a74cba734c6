use crate::config::DataConfig;
use crate::provider::{check_alignment, VectorProvider};
use crate::query::Recommender;
use crate::storage::CorpusStore;
use crate::vector::VectorTable;
use crate::Result;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Articles and their vectors, validated to be row-aligned.
#[derive(Debug, Clone)]
pub struct Catalog {
    corpus: CorpusStore,
    vectors: VectorTable,
}

impl Catalog {
    pub fn new(corpus: CorpusStore, vectors: VectorTable) -> Result<Self> {
        check_alignment(&corpus, &vectors)?;
        Ok(Self { corpus, vectors })
    }

    pub fn build(corpus: CorpusStore, provider: &dyn VectorProvider) -> Result<Self> {
        let vectors = provider.build(&corpus)?;
        Self::new(corpus, vectors)
    }

    pub fn load(config: &DataConfig) -> Result<Self> {
        let started = Instant::now();
        let corpus = CorpusStore::load_json(&config.articles)?;
        let provider = config.provider();
        let catalog = Self::build(corpus, provider.as_ref())?;

        info!(
            articles = catalog.len(),
            dimension = catalog.vectors.dimension(),
            provider = provider.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    pub fn vectors(&self) -> &VectorTable {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn recommender(&self) -> Recommender<'_> {
        Recommender::new(&self.corpus, &self.vectors)
    }
}

/// One-time initialization guard for the catalog.
///
/// The first caller runs the loader; concurrent callers block until it
/// finishes and then share the same `Arc`. A failed load leaves the cell
/// empty so the error reaches whoever asked.
#[derive(Debug, Default)]
pub struct CatalogCell {
    cell: OnceCell<Arc<Catalog>>,
}

impl CatalogCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<Catalog>>
    where
        F: FnOnce() -> Result<Catalog>,
    {
        self.cell
            .get_or_try_init(|| load().map(Arc::new))
            .map(Arc::clone)
    }

    pub fn get(&self) -> Option<Arc<Catalog>> {
        self.cell.get().cloned()
    }
}

static GLOBAL: CatalogCell = CatalogCell::new();

/// Process-wide catalog cell, filled once at startup.
pub fn global() -> &'static CatalogCell {
    &GLOBAL
}
