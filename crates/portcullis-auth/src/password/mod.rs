//! Deterministic salted password hashing.

pub mod hasher;

pub use hasher::CredentialHasher;
