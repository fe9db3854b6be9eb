//! Attendance tracker - integration test support.
//!
//! Re-exports the workspace crates so integration tests can use a single
//! `rollcall_test::component` path.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    pub use rollcall_core::*;
    pub use rollcall_service::*;

    pub mod db {
        pub use rollcall_db::db::*;

        pub mod connection {
            pub use rollcall_app::db_handler::DbProviderHandler;
            pub use rollcall_db::db::connection::*;
        }
    }

    pub mod model {
        pub use rollcall_db::model::*;
    }

    pub mod config {
        pub use rollcall_app::config::ConfigHandler;
        pub use rollcall_core::config::*;
    }
}

pub mod app {
    pub use rollcall_app::*;

    pub mod api {
        pub use rollcall_app::app::api::*;
    }
}
