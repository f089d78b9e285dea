mod availability;
mod enrollment;
mod package;
mod pet;
mod training_session;
mod training_template;

pub use availability::*;
pub use enrollment::*;
pub use package::*;
pub use pet::*;
pub use training_session::*;
pub use training_template::*;
