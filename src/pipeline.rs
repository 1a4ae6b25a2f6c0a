use crate::assets::AssetPaths;
use crate::images::{ImageLookup, ImageStores};
use crate::model::{GameRow, MatchRecord};
use crate::ordering;
use crate::reducer::RowReducer;
use crate::series::{self, TerminalRule};
use crate::source::{MatchSource, TournamentFilter};
use crate::stage::StageClassifier;

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub assets: AssetPaths,
    pub terminal_rule: TerminalRule,
}

/// Folds, annotates and orders an already-fetched set of rows. A fresh
/// classifier is used so nothing is carried over from an earlier pass.
pub fn aggregate<L: ImageLookup + ?Sized>(
    rows: Vec<GameRow>,
    options: &PipelineOptions,
    images: &mut ImageStores,
    lookup: &L,
) -> Vec<MatchRecord> {
    let row_count = rows.len();
    let mut classifier = StageClassifier::new();

    let mut records =
        RowReducer::new(&mut classifier, &options.assets, images, lookup).fold_all(rows);
    series::annotate(&mut records, options.terminal_rule);
    ordering::order(&mut records);

    tracing::info!(
        rows = row_count,
        games = records.len(),
        stages = classifier.seen_labels().len(),
        "aggregated match results"
    );
    records
}

/// One full pass: fetch, aggregate, order. A failing data source counts as
/// "no data" and yields an empty list.
pub fn run<S, L>(
    source: &S,
    filter: &TournamentFilter,
    options: &PipelineOptions,
    images: &mut ImageStores,
    lookup: &L,
) -> Vec<MatchRecord>
where
    S: MatchSource + ?Sized,
    L: ImageLookup + ?Sized,
{
    let rows = match source.fetch_rows(filter) {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(
                tournament = %filter.overview_page,
                error = %err,
                "data source failed, rendering without data"
            );
            Vec::new()
        }
    };

    if rows.is_empty() {
        tracing::info!(tournament = %filter.overview_page, "no games matched");
        return Vec::new();
    }

    aggregate(rows, options, images, lookup)
}
