pub mod mutations;
pub use mutations::{ConfirmationState, Mutation, MutationError, MutationLog};
pub mod state;
pub use state::{BoardColumn, BoardEffect, BoardError, BoardState, MoveOutcome};
