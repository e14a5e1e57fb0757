// tests/translate.rs

//! TOSCA to native translation, written output and the reverse direction.

mod common;

use common::{PING_PONG_TOSCA, PING_VNFD_YAML, ping_pong_dir, write_file};
use nfvkit::descriptor::{DescriptorFormat, DescriptorSet};
use nfvkit::package;
use nfvkit::tosca::ToscaTemplate;
use nfvkit::translator::{OutputOptions, TranslateOptions, native_to_tosca, tosca_to_native, translate_file};
use std::collections::BTreeMap;

#[test]
fn test_ping_pong_to_native() {
    let template = ToscaTemplate::parse(PING_PONG_TOSCA).unwrap();
    let output = tosca_to_native(&template, &TranslateOptions::default()).unwrap();

    assert_eq!(output.nsd.id, "ping_pong_nsd");
    assert_eq!(output.nsd.vendor.as_deref(), Some("RIFT.io"));
    let ids: Vec<_> = output.vnfds.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["ping_vnfd_id", "pong_vnfd_id"]);

    let ping = &output.vnfds[0];
    let vdu = &ping.vdu[0];
    let flavor = vdu.vm_flavor.as_ref().unwrap();
    assert_eq!(flavor.vcpu_count, Some(2));
    assert_eq!(flavor.memory_mb, Some(512));
    assert_eq!(flavor.storage_gb, Some(4));
    assert_eq!(vdu.image.as_deref(), Some("Fedora-x86_64-20-20131211.1-sda-ping.qcow2"));
    assert_eq!(vdu.external_interface.len(), 2);
    assert_eq!(vdu.external_interface[0].name, "eth0");
    assert_eq!(vdu.external_interface[1].vnfd_connection_point_ref, "ping_vnfd/cp1");
    // Single-VDU VNFs are managed through their VDU
    assert_eq!(ping.mgmt_interface.as_ref().unwrap().vdu_id.as_deref(), Some("ping_vdu_id"));

    let pong_flavor = output.vnfds[1].vdu[0].vm_flavor.as_ref().unwrap();
    assert_eq!(pong_flavor.memory_mb, Some(1000));

    let mgmt = &output.nsd.vld[0];
    assert_eq!(mgmt.id, "mgmt_vl_id");
    assert_eq!(mgmt.vld_type.as_deref(), Some("ELAN"));
    assert_eq!(mgmt.vim_network_name.as_deref(), Some("private"));
    let refs: Vec<_> = mgmt
        .vnfd_connection_point_ref
        .iter()
        .map(|r| (r.member_vnf_index_ref, r.vnfd_connection_point_ref.as_str()))
        .collect();
    assert_eq!(refs, vec![(1, "ping_vnfd/cp0"), (2, "pong_vnfd/cp0")]);
    assert_eq!(output.nsd.vld[1].vld_type.as_deref(), Some("ELINE"));

    let scaling = &output.nsd.scaling_group_descriptor[0];
    assert_eq!(scaling.name, "ping_group");
    assert_eq!(scaling.max_instance_count, Some(10));
    assert_eq!(scaling.vnfd_member[0].member_vnf_index_ref, 1);

    assert!(output.descriptor_set().validate().is_empty());
}

#[test]
fn test_input_override() {
    let template = ToscaTemplate::parse(PING_PONG_TOSCA).unwrap();
    let options = TranslateOptions {
        strict: false,
        inputs: BTreeMap::from([("mgmt_net_name".to_string(), "mgmt".to_string())]),
    };
    let output = tosca_to_native(&template, &options).unwrap();
    assert_eq!(output.nsd.vld[0].vim_network_name.as_deref(), Some("mgmt"));

    let options = TranslateOptions {
        strict: false,
        inputs: BTreeMap::from([("no_such_input".to_string(), "x".to_string())]),
    };
    assert!(tosca_to_native(&template, &options).is_err());
}

#[test]
fn test_write_descriptor_files() {
    let (dir, template) = ping_pong_dir();
    let output = translate_file(&template, &TranslateOptions::default()).unwrap();
    let out_dir = dir.path().join("out");
    let written = output.write(&out_dir, dir.path(), OutputOptions::default()).unwrap();

    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["ping_vnfd_vnfd.yaml", "pong_vnfd_vnfd.yaml", "ping_pong_nsd_nsd.yaml"]
    );

    let reloaded = DescriptorSet::load_all(&written).unwrap();
    assert_eq!(reloaded.vnfds.len(), 2);
    assert_eq!(reloaded.nsds[0].constituent_vnfd.len(), 2);
    assert!(reloaded.validate().is_empty());
}

#[test]
fn test_write_archives_with_artifacts() {
    let (dir, template) = ping_pong_dir();
    let output = translate_file(&template, &TranslateOptions::default()).unwrap();
    let out_dir = dir.path().join("pkgs");
    let options = OutputOptions {
        format: DescriptorFormat::Json,
        archive: true,
    };
    let written = output.write(&out_dir, dir.path(), options).unwrap();
    assert_eq!(written.len(), 3);

    let report = package::inspect(&written[0]).unwrap();
    assert!(report.is_valid());
    assert_eq!(report.descriptor.as_deref(), Some("ping_vnfd_vnfd.json"));
    assert!(
        report
            .entries
            .iter()
            .any(|e| e.path == "images/Fedora-x86_64-20-20131211.1-sda-ping.qcow2")
    );

    // The pong image is only named, never shipped as an artifact
    let pong = package::inspect(&written[1]).unwrap();
    assert!(!pong.entries.iter().any(|e| e.path.starts_with("images/")));
}

#[test]
fn test_round_trip_through_tosca() {
    let template = ToscaTemplate::parse(PING_PONG_TOSCA).unwrap();
    let first = tosca_to_native(&template, &TranslateOptions::default()).unwrap();

    let regenerated = native_to_tosca(&first.descriptor_set()).unwrap();
    let yaml = regenerated.to_yaml().unwrap();
    let reparsed = ToscaTemplate::parse(&yaml).unwrap();
    let second = tosca_to_native(&reparsed, &TranslateOptions::default()).unwrap();

    assert_eq!(second.nsd.id, first.nsd.id);
    for (a, b) in first.vnfds.iter().zip(&second.vnfds) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.connection_point, b.connection_point);
        assert_eq!(a.vdu[0].id, b.vdu[0].id);
        assert_eq!(a.vdu[0].vm_flavor, b.vdu[0].vm_flavor);
        assert_eq!(a.vdu[0].image, b.vdu[0].image);
    }

    let links = |nsd: &nfvkit::descriptor::Nsd| {
        let mut refs: Vec<(String, u32, String)> = nsd
            .vld
            .iter()
            .flat_map(|vld| {
                vld.vnfd_connection_point_ref
                    .iter()
                    .map(|r| (vld.id.clone(), r.member_vnf_index_ref, r.vnfd_connection_point_ref.clone()))
            })
            .collect();
        refs.sort();
        refs
    };
    assert_eq!(links(&first.nsd), links(&second.nsd));
    assert_eq!(second.nsd.scaling_group_descriptor.len(), 1);
}

#[test]
fn test_vnfd_only_to_tosca() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "ping_vnfd.yaml", PING_VNFD_YAML);
    let set = DescriptorSet::load(&path).unwrap();

    let template = native_to_tosca(&set).unwrap();
    assert_eq!(template.metadata_value("ID").as_deref(), Some("ping_vnfd_id"));

    let output = tosca_to_native(&template, &TranslateOptions::default()).unwrap();
    assert_eq!(output.vnfds.len(), 1);
    assert_eq!(output.vnfds[0].vdu[0].vm_flavor, set.vnfds[0].vdu[0].vm_flavor);
    assert_eq!(output.nsd.constituent_vnfd[0].vnfd_id_ref, "ping_vnfd_id");
}
