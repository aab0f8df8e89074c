pub mod config;
pub mod error;
pub mod llm;
pub mod materialize;
pub mod node;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod session;

pub use config::{Args, Config};
pub use error::{LayoutError, LlmError};
pub use llm::{ChatClient, LayoutSource};
pub use materialize::{materialize, MaterializeReport};
pub use node::{delete_node, Node, NodeId};
pub use normalize::{normalize, normalize_or_raw};
pub use parser::parse;
pub use render::{render, render_colored};
pub use session::{Outcome, Session};
