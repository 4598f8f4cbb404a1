pub mod core {
    pub mod data_type;
    pub mod value;
}

pub mod execution {
    pub mod connection;
}

pub mod pagination {
    pub mod offset;
}

pub mod records {
    pub mod batch;
    pub mod row;
}
