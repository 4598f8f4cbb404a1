pub mod error;

pub mod execution {
    pub mod factory;
    pub mod orchestrator;
    pub mod state;
}

#[cfg(test)]
mod tests {
    mod orchestrator;
}
