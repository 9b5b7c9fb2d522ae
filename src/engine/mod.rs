pub mod enricher;
pub mod index;
pub mod outcome;
pub mod resolver;
pub mod table;
pub mod translate;

pub use enricher::Enricher;
pub use index::{BetKind, KeyedIndex, MarketIndex, SportsbookIndex};
pub use outcome::{BetOutcome, OVER_PARTICIPANT_ID, UNDER_PARTICIPANT_ID};
pub use resolver::{SearchTerm, SynonymTable};
pub use table::Table;
pub use translate::TranslationTable;
