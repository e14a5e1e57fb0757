// src/descriptor/validate.rs

//! Structural validation of NSDs and VNFDs
//!
//! Validation never stops at the first problem: every check runs and the
//! caller gets the full list of issues. Errors make a descriptor unusable
//! by the orchestrator; warnings flag references that cannot be checked
//! locally (for example an NSD whose VNFDs were not supplied).

use super::{Nsd, Vnfd};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    /// Location inside the descriptor, e.g. `vnfd[ping]/vdu[iovdu_0]`
    pub path: String,
    pub message: String,
}

impl Issue {
    fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// True when any issue is an error
pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(Issue::is_error)
}

fn duplicates<'a, I: IntoIterator<Item = &'a str>>(items: I) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for item in items {
        if !seen.insert(item) && !dups.contains(&item) {
            dups.push(item);
        }
    }
    dups
}

/// Validate a VNFD on its own
pub fn validate_vnfd(vnfd: &Vnfd) -> Vec<Issue> {
    let mut issues = Vec::new();
    let root = format!("vnfd[{}]", vnfd.id);

    if vnfd.id.trim().is_empty() {
        issues.push(Issue::error(&root, "id must not be empty"));
    }
    if vnfd.vdu.is_empty() {
        issues.push(Issue::warning(&root, "descriptor has no VDUs"));
    }

    for dup in duplicates(vnfd.vdu.iter().map(|v| v.id.as_str())) {
        issues.push(Issue::error(&root, format!("duplicate vdu id '{}'", dup)));
    }
    for dup in duplicates(vnfd.connection_point.iter().map(|cp| cp.name.as_str())) {
        issues.push(Issue::error(&root, format!("duplicate connection-point '{}'", dup)));
    }

    let cp_names: HashSet<&str> = vnfd.connection_point.iter().map(|cp| cp.name.as_str()).collect();
    let mut internal_cps: HashSet<&str> = HashSet::new();

    for vdu in &vnfd.vdu {
        let path = format!("{}/vdu[{}]", root, vdu.id);
        if vdu.id.trim().is_empty() {
            issues.push(Issue::error(&path, "vdu id must not be empty"));
        }
        if vdu.count == Some(0) {
            issues.push(Issue::error(&path, "count must be at least 1"));
        }
        if let Some(flavor) = &vdu.vm_flavor {
            if flavor.vcpu_count == Some(0) {
                issues.push(Issue::error(&path, "vm-flavor vcpu-count must be non-zero"));
            }
            if flavor.memory_mb == Some(0) {
                issues.push(Issue::error(&path, "vm-flavor memory-mb must be non-zero"));
            }
            if flavor.storage_gb == Some(0) {
                issues.push(Issue::error(&path, "vm-flavor storage-gb must be non-zero"));
            }
        }
        if vdu.image.is_none() {
            issues.push(Issue::warning(&path, "no image specified"));
        }
        for iface in &vdu.external_interface {
            if !cp_names.contains(iface.vnfd_connection_point_ref.as_str()) {
                issues.push(Issue::error(
                    &path,
                    format!(
                        "external-interface '{}' references unknown connection-point '{}'",
                        iface.name, iface.vnfd_connection_point_ref
                    ),
                ));
            }
        }
        for icp in &vdu.internal_connection_point {
            internal_cps.insert(icp.id.as_str());
        }
    }

    if let Some(mgmt) = &vnfd.mgmt_interface {
        if let Some(vdu_id) = &mgmt.vdu_id {
            if vnfd.vdu(vdu_id).is_none() {
                issues.push(Issue::error(
                    format!("{}/mgmt-interface", root),
                    format!("vdu-id '{}' does not name a vdu", vdu_id),
                ));
            }
        }
        if let Some(cp) = &mgmt.cp {
            if !cp_names.contains(cp.as_str()) {
                issues.push(Issue::error(
                    format!("{}/mgmt-interface", root),
                    format!("cp '{}' does not name a connection-point", cp),
                ));
            }
        }
    }

    for ivld in &vnfd.internal_vld {
        let path = format!("{}/internal-vld[{}]", root, ivld.id);
        for cp_ref in &ivld.internal_connection_point {
            if !internal_cps.contains(cp_ref.id_ref.as_str()) {
                issues.push(Issue::error(
                    &path,
                    format!("unknown internal-connection-point '{}'", cp_ref.id_ref),
                ));
            }
        }
    }

    issues
}

/// Validate an NSD, resolving constituent references against `vnfds`
pub fn validate_nsd(nsd: &Nsd, vnfds: &[Vnfd]) -> Vec<Issue> {
    let mut issues = Vec::new();
    let root = format!("nsd[{}]", nsd.id);

    if nsd.id.trim().is_empty() {
        issues.push(Issue::error(&root, "id must not be empty"));
    }
    if nsd.constituent_vnfd.is_empty() {
        issues.push(Issue::warning(&root, "descriptor has no constituent VNFDs"));
    }

    let vnfd_by_id: HashMap<&str, &Vnfd> = vnfds.iter().map(|v| (v.id.as_str(), v)).collect();

    let mut members: HashMap<u32, &str> = HashMap::new();
    for constituent in &nsd.constituent_vnfd {
        let path = format!("{}/constituent-vnfd[{}]", root, constituent.member_vnf_index);
        if members
            .insert(constituent.member_vnf_index, constituent.vnfd_id_ref.as_str())
            .is_some()
        {
            issues.push(Issue::error(&path, "duplicate member-vnf-index"));
        }
        if !vnfd_by_id.contains_key(constituent.vnfd_id_ref.as_str()) {
            issues.push(Issue::warning(
                &path,
                format!("vnfd '{}' not supplied, references not checked", constituent.vnfd_id_ref),
            ));
        }
    }

    // Shared check for (member index, vnfd id, connection point) triples
    let check_cp_ref = |issues: &mut Vec<Issue>, path: &str, index: u32, vnfd_id: &str, cp: &str| {
        match members.get(&index) {
            None => issues.push(Issue::error(path, format!("unknown member-vnf-index-ref {}", index))),
            Some(member_vnfd) if *member_vnfd != vnfd_id => issues.push(Issue::error(
                path,
                format!(
                    "member {} is vnfd '{}', not '{}'",
                    index, member_vnfd, vnfd_id
                ),
            )),
            Some(_) => {
                if let Some(vnfd) = vnfd_by_id.get(vnfd_id) {
                    if vnfd.connection_point(cp).is_none() {
                        issues.push(Issue::error(
                            path,
                            format!("vnfd '{}' has no connection-point '{}'", vnfd_id, cp),
                        ));
                    }
                }
            }
        }
    };

    for dup in duplicates(nsd.vld.iter().map(|v| v.id.as_str())) {
        issues.push(Issue::error(&root, format!("duplicate vld id '{}'", dup)));
    }
    for vld in &nsd.vld {
        let path = format!("{}/vld[{}]", root, vld.id);
        for cp_ref in &vld.vnfd_connection_point_ref {
            check_cp_ref(
                &mut issues,
                &path,
                cp_ref.member_vnf_index_ref,
                &cp_ref.vnfd_id_ref,
                &cp_ref.vnfd_connection_point_ref,
            );
        }
    }

    for group in &nsd.scaling_group_descriptor {
        let path = format!("{}/scaling-group-descriptor[{}]", root, group.name);
        if let (Some(min), Some(max)) = (group.min_instance_count, group.max_instance_count) {
            if min > max {
                issues.push(Issue::error(
                    &path,
                    format!("min-instance-count {} exceeds max-instance-count {}", min, max),
                ));
            }
        }
        for member in &group.vnfd_member {
            if !members.contains_key(&member.member_vnf_index_ref) {
                issues.push(Issue::error(
                    &path,
                    format!("unknown member-vnf-index-ref {}", member.member_vnf_index_ref),
                ));
            }
        }
    }

    for group in &nsd.placement_groups {
        let path = format!("{}/placement-groups[{}]", root, group.name);
        for member in &group.member_vnfd {
            match members.get(&member.member_vnf_index_ref) {
                None => issues.push(Issue::error(
                    &path,
                    format!("unknown member-vnf-index-ref {}", member.member_vnf_index_ref),
                )),
                Some(vnfd_id) if *vnfd_id != member.vnfd_id_ref => issues.push(Issue::error(
                    &path,
                    format!(
                        "member {} is vnfd '{}', not '{}'",
                        member.member_vnf_index_ref, vnfd_id, member.vnfd_id_ref
                    ),
                )),
                Some(_) => {}
            }
        }
    }

    let mut seqs = HashSet::new();
    for primitive in &nsd.initial_config_primitive {
        if !seqs.insert(primitive.seq) {
            issues.push(Issue::error(
                format!("{}/initial-config-primitive[{}]", root, primitive.name),
                format!("duplicate seq {}", primitive.seq),
            ));
        }
    }

    for graph in &nsd.vnffgd {
        for rsp in &graph.rsp {
            let path = format!("{}/vnffgd[{}]/rsp[{}]", root, graph.id, rsp.id);
            for hop in &rsp.vnfd_connection_point_ref {
                check_cp_ref(
                    &mut issues,
                    &path,
                    hop.member_vnf_index_ref,
                    &hop.vnfd_id_ref,
                    &hop.vnfd_connection_point_ref,
                );
            }
        }
    }

    issues
}
