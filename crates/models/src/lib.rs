pub mod errors;
pub mod db;
pub mod project;
pub mod issue;

#[cfg(test)]
mod tests;
