pub mod config;
pub mod error;
pub mod session;

pub mod memory {
    pub mod address_space;
    pub mod allocator;
    pub mod block;
    pub mod coalescer;
    pub mod index;
}

pub mod paging {
    pub mod frame_table;
    pub mod replacement;
}

pub mod cli {
    pub mod command;
    pub mod demo;
    pub mod display;
    pub mod shell;
    pub mod utils;
}

pub mod net {
    pub mod client;
    pub mod server;
}
