pub mod element;
pub mod model;
pub mod schema;

pub use element::{FieldOption, FormElement, Visualization};
pub use model::{Entity, ModelGroup, OwnedElement};
pub use schema::{FormField, GeneratedFormSchema};
