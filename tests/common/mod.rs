// tests/common/mod.rs

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Ping-pong network service: two single-VDU VNFs on one management network
/// and one data link, with a scaling group and an image artifact.
pub const PING_PONG_TOSCA: &str = r#"
tosca_definitions_version: tosca_simple_profile_for_nfv_1_0
description: Toy NS
metadata:
  ID: ping_pong_nsd
  vendor: RIFT.io
  version: 1.0
topology_template:
  inputs:
    mgmt_net_name:
      type: string
      default: private
  node_templates:
    mgmt_vl:
      type: tosca.nodes.nfv.VL.ELAN
      properties:
        id: mgmt_vl_id
        name: mgmt_vl
        vim_network_name: { get_input: mgmt_net_name }
    data_vl:
      type: tosca.nodes.nfv.VL.ELine
      properties:
        id: data_vl_id
        name: data_vl
    ping_vnfd:
      type: tosca.nodes.nfv.VNF
      properties:
        id: ping_vnfd_id
        name: ping_vnfd
        vendor: RIFT.io
        version: 1.1
        member_index: 1
      requirements:
        - vdus:
            node: ping_vdu
    pong_vnfd:
      type: tosca.nodes.nfv.VNF
      properties:
        id: pong_vnfd_id
        name: pong_vnfd
        member_index: 2
      requirements:
        - vdus:
            node: pong_vdu
    ping_vdu:
      type: tosca.nodes.nfv.VDU
      properties:
        id: ping_vdu_id
        count: 1
      capabilities:
        virtual_compute:
          properties:
            virtual_cpu:
              num_virtual_cpu: 2
            virtual_memory:
              virtual_mem_size: 512 MB
            virtual_storage:
              size_of_storage: 4 GB
      artifacts:
        ping_image:
          file: images/Fedora-x86_64-20-20131211.1-sda-ping.qcow2
          type: tosca.artifacts.Deployment.Image.VM
    pong_vdu:
      type: tosca.nodes.nfv.VDU
      properties:
        id: pong_vdu_id
        image: Fedora-x86_64-20-20131211.1-sda-pong.qcow2
      capabilities:
        virtual_compute:
          properties:
            virtual_cpu:
              num_virtual_cpu: 1
            virtual_memory:
              virtual_mem_size: 1 GB
    ping_cp_mgmt:
      type: tosca.nodes.nfv.CP
      properties:
        name: ping_vnfd/cp0
      requirements:
        - virtualBinding:
            node: ping_vdu
        - virtualLink:
            node: mgmt_vl
    ping_cp_data:
      type: tosca.nodes.nfv.CP
      properties:
        name: ping_vnfd/cp1
      requirements:
        - virtualBinding:
            node: ping_vdu
        - virtualLink:
            node: data_vl
    pong_cp_mgmt:
      type: tosca.nodes.nfv.CP
      properties:
        name: pong_vnfd/cp0
      requirements:
        - virtualBinding:
            node: pong_vdu
        - virtualLink:
            node: mgmt_vl
    pong_cp_data:
      type: tosca.nodes.nfv.CP
      properties:
        name: pong_vnfd/cp1
      requirements:
        - virtualBinding:
            node: pong_vdu
        - virtualLink:
            node: data_vl
  policies:
    - scaling_group_descriptor:
        type: tosca.policies.riftio.ScalingGroup
        properties:
          name: ping_group
          max_instance_count: 10
          min_instance_count: 1
          vnfd_members:
            ping_vnfd: 1
"#;

/// Native VNFD with one VDU and one connection point
pub const PING_VNFD_YAML: &str = r#"
vnfd:vnfd-catalog:
  vnfd:
  - id: ping_vnfd_id
    name: ping_vnfd
    vendor: RIFT.io
    version: '1.1'
    mgmt-interface:
      vdu-id: ping_vdu_id
    connection-point:
    - name: ping_vnfd/cp0
      type: VPORT
    vdu:
    - id: ping_vdu_id
      name: ping_vdu
      count: 1
      image: ping.qcow2
      vm-flavor:
        vcpu-count: 2
        memory-mb: 512
        storage-gb: 4
      external-interface:
      - name: eth0
        vnfd-connection-point-ref: ping_vnfd/cp0
        virtual-interface:
          type: VIRTIO
"#;

/// Write `content` to `name` under `dir`, creating parent directories
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Temp dir holding the ping-pong template and its image artifact
pub fn ping_pong_dir() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let template = write_file(dir.path(), "ping_pong.yaml", PING_PONG_TOSCA);
    write_file(
        dir.path(),
        "images/Fedora-x86_64-20-20131211.1-sda-ping.qcow2",
        "not really an image",
    );
    (dir, template)
}
