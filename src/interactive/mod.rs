// Command-line front ends. They run the library workflow and print each
// stage to stdout.

pub mod fund;
pub mod wallet;
