pub mod error;

pub mod sql {
    pub mod source;

    pub mod query {
        pub mod generator;
    }

    pub mod mssql {
        pub mod adapter;
        pub mod decode;
    }
}

pub mod bigquery {
    pub mod auth;
    pub mod client;
    pub mod job;
    pub mod loader;
    pub mod table;
}

pub mod staging {
    pub mod writer;
}
