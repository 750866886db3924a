pub mod convert;
pub mod helper;
pub mod hex_utils;
pub mod rpc_client;
