pub mod browse;
pub mod init;
pub mod teams;
