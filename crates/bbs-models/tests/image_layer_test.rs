// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Image layer conversion tests.

use bbs_models::{
    Action, DigestAlgorithm, DownloadAction, ImageLayer, ImageLayers, LayerType, MediaType,
    RunAction, Validator,
};

fn exclusive_layer() -> ImageLayer {
    ImageLayer {
        name: "app".to_string(),
        url: "https://blobs/app-layer.tgz".to_string(),
        destination_path: "/home/vcap/app".to_string(),
        layer_type: LayerType::Exclusive,
        media_type: MediaType::Tgz,
        digest_algorithm: Some(DigestAlgorithm::Sha512),
        digest_value: "f00d".to_string(),
    }
}

fn shared_layer() -> ImageLayer {
    ImageLayer {
        name: "buildpack".to_string(),
        url: "https://blobs/ruby-buildpack.zip".to_string(),
        destination_path: "/tmp/buildpacks/ruby".to_string(),
        layer_type: LayerType::Shared,
        media_type: MediaType::Zip,
        digest_algorithm: None,
        digest_value: String::new(),
    }
}

#[test]
fn test_mixed_layers_with_existing_action() {
    let layers = ImageLayers::from(vec![exclusive_layer(), shared_layer()]);
    assert!(layers.validate().is_ok());

    let existing: Action = RunAction::new("/app/start", "vcap").into();
    let action = layers
        .to_download_actions("vcap", Some(existing.clone()))
        .unwrap();

    let serial = action.as_serial().unwrap();
    let steps: Vec<&Action> = serial.children().collect();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1], &existing);

    let parallel = steps[0].as_parallel().unwrap();
    let downloads: Vec<&DownloadAction> = parallel
        .children()
        .map(|a| a.as_download().unwrap())
        .collect();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].from, "https://blobs/app-layer.tgz");
    assert_eq!(downloads[0].to, "/home/vcap/app");
    assert_eq!(downloads[0].cache_key, "sha512:f00d");
    assert_eq!(downloads[0].checksum_algorithm, "sha512");
    assert_eq!(downloads[0].checksum_value, "f00d");
    assert_eq!(downloads[0].user, "vcap");

    let deps = layers.to_cached_dependencies();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].cache_key, "https://blobs/ruby-buildpack.zip");
    assert_eq!(deps[0].from, "https://blobs/ruby-buildpack.zip");
    assert_eq!(deps[0].to, "/tmp/buildpacks/ruby");
    assert!(deps[0].checksum_algorithm.is_empty());
    assert!(deps[0].validate().is_ok());
}

#[test]
fn test_exclusive_layers_without_existing_action() {
    let mut second = exclusive_layer();
    second.destination_path = "/home/vcap/deps".to_string();
    let layers = ImageLayers::from(vec![exclusive_layer(), second]);

    let action = layers.to_download_actions("root", None).unwrap();
    assert_eq!(action.as_parallel().unwrap().children().count(), 2);
    assert!(action.validate().is_ok());
    assert!(layers.to_cached_dependencies().is_empty());
}

#[test]
fn test_layer_wire_format() {
    let json = serde_json::to_value(exclusive_layer()).unwrap();
    assert_eq!(json["layer_type"], "EXCLUSIVE");
    assert_eq!(json["media_type"], "TGZ");
    assert_eq!(json["digest_algorithm"], "SHA512");

    let layers: ImageLayers = serde_json::from_value(serde_json::json!([
        {"url": "http://x", "destination_path": "/x", "layer_type": "SHARED", "media_type": "TAR"}
    ]))
    .unwrap();
    assert_eq!(layers.0.len(), 1);
    assert_eq!(layers.0[0].digest_algorithm, None);
    assert!(layers.validate().is_ok());
}

#[test]
fn test_invalid_layers_aggregate() {
    let mut bad_exclusive = exclusive_layer();
    bad_exclusive.digest_algorithm = None;
    let mut bad_shared = shared_layer();
    bad_shared.url.clear();

    let err = ImageLayers::from(vec![bad_exclusive, bad_shared])
        .validate()
        .unwrap_err();
    assert_eq!(err.len(), 2);
    assert!(err.has_field("digest_algorithm"));
    assert!(err.has_field("url"));
}
