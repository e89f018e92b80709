pub mod boxoffice;
pub mod hotsearch;
pub mod pingpong;
pub mod weather;
