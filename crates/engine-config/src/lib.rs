pub mod error;

pub mod settings {
    pub mod selection;
    pub mod transfer;
    pub mod write_mode;
}

pub mod report {
    pub mod result;
}
