// tests/vault/concurrency.rs
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;

use vaulted_core::{decrypt, KeyResolver, Vault};

use crate::common::TestDir;

const THREADS: usize = 8;

#[test]
fn test_vault_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Vault>();
}

#[test]
fn test_concurrent_resolution_converges_on_one_key() {
    let dir = TestDir::new();
    let barrier = Arc::new(Barrier::new(THREADS));

    let keys: Vec<[u8; 32]> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let barrier = barrier.clone();
                let key_path = dir.key_path.clone();
                s.spawn(move || {
                    barrier.wait();
                    let resolved = KeyResolver::new(&key_path).resolve().unwrap();
                    *resolved.key.expose_secret()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(keys.iter().all(|k| k == &keys[0]));

    // Exactly the key file: no duplicates, no leftover temp files
    assert_eq!(dir.entries(), vec![dir.key_path.clone()]);
    let on_disk = KeyResolver::new(&dir.key_path).resolve().unwrap();
    assert_eq!(on_disk.key.expose_secret(), &keys[0]);
}

#[test]
fn test_encryption_during_rotation_uses_whole_keys() {
    let dir = TestDir::new();
    let vault = Arc::new(dir.open());
    let old_key = KeyResolver::new(&dir.key_path).resolve().unwrap().key;
    let target = dir.path("doc.enc");
    fs::write(&target, vault.encrypt(b"doc").unwrap()).unwrap();

    let barrier = Arc::new(Barrier::new(THREADS + 1));
    let blobs: Vec<Vec<u8>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let vault = vault.clone();
                let barrier = barrier.clone();
                s.spawn(move || {
                    barrier.wait();
                    (0..50)
                        .map(|n| vault.encrypt(format!("{i}:{n}").as_bytes()).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        barrier.wait();
        vault.rotate(&[&target]).unwrap();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });
    let new_key = KeyResolver::new(&dir.key_path).resolve().unwrap().key;

    assert_eq!(blobs.len(), THREADS * 50);
    for blob in &blobs {
        let under_old = decrypt(&old_key, blob).is_ok();
        let under_new = decrypt(&new_key, blob).is_ok();
        assert!(under_old ^ under_new, "blob sealed under a torn or unknown key");
    }
    assert_eq!(vault.decrypt(&fs::read(&target).unwrap()).unwrap().as_slice(), b"doc");
}

#[test]
fn test_concurrent_decrypts_share_the_key() {
    let dir = TestDir::new();
    let vault = Arc::new(dir.open());
    let blob = vault.encrypt(b"shared read").unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS {
            let vault = vault.clone();
            let blob = blob.clone();
            s.spawn(move || {
                for _ in 0..20 {
                    assert_eq!(vault.decrypt(&blob).unwrap().as_slice(), b"shared read");
                }
            });
        }
    });
}
