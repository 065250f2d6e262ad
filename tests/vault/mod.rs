// tests/vault/mod.rs

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod resolver;
