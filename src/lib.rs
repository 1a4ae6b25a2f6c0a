pub mod assets;
pub mod error;
pub mod export;
pub mod images;
pub mod leaguepedia;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod pipeline;
pub mod reducer;
pub mod series;
pub mod source;
pub mod stage;
