pub mod routines {
    pub mod evaluation {
        pub mod errors;
        pub mod newton;
        pub mod special;
    }
    pub mod logger;
    pub mod settings;
}

pub mod structs {
    pub mod alpha;
    pub mod gammas;
}

pub mod prelude {
    pub use crate::routines::evaluation::errors::{NewtonError, NewtonResult};
    pub use crate::routines::evaluation::newton::{
        estimate_alpha, gradient, hessian_constant, hessian_diagonal, newton_step, AlphaResult,
        Linearization, Status,
    };
    pub use crate::routines::evaluation::special;
    pub use crate::routines::logger::setup_log;
    pub use crate::routines::settings::{self, Settings};
    pub use crate::structs::alpha::Alpha;
    pub use crate::structs::gammas::Gammas;
}
