// 模块声明
pub mod brute;
pub mod capture;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod iterator;
