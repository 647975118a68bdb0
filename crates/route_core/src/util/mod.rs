pub mod cli;
pub mod math;
#[cfg(test)]
pub mod test_networks;
