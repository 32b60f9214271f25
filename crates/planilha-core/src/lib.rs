pub mod cell;
pub mod classify;
pub mod dimensions;
pub mod error;
pub mod grid;
pub mod range;
pub mod tabular;
pub mod tenant;

pub use cell::{Cell, CellRecord, CellWrite, DelimitedRecord};
pub use classify::{classify, TypeTag};
pub use dimensions::GridDimensions;
pub use error::{GridError, GridResult};
pub use grid::{disallowed_terms, RowView, SparseGrid};
pub use range::{col_to_label, CellCoord};
pub use tabular::{prepare_tabular, TabularGeneration};
pub use tenant::{Tenant, REGISTRY};
