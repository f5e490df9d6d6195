//! CSV export functionality.
//!
//! One flattened table per result aggregate. Every writer returns the number
//! of data rows it wrote.

use std::io::Write;

use csv::Writer;

use crate::orchestrator::MappingResults;

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Domain to zone to nameserver to address, one row per address.
///
/// A domain without zones still gets a row with empty zone columns.
pub fn write_zones_csv<W: Write>(results: &MappingResults, writer: W) -> csv::Result<usize> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["domain", "zone", "nameserver", "address"])?;
    let mut rows = 0;
    for (domain, zones) in &results.zone_dependencies.per_domain {
        if zones.is_empty() {
            wtr.write_record([domain.as_str(), "", "", ""])?;
            rows += 1;
            continue;
        }
        for zone in zones {
            for (nameserver, record) in zone.iter_nameservers() {
                for address in record.values() {
                    wtr.write_record([
                        domain.as_str(),
                        zone.name().as_str(),
                        nameserver.as_str(),
                        address.as_str(),
                    ])?;
                    rows += 1;
                }
            }
        }
    }
    wtr.flush()?;
    Ok(rows)
}

/// One row per nameserver; unresolved fields stay empty.
pub fn write_as_csv<W: Write>(results: &MappingResults, writer: W) -> csv::Result<usize> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([
        "nameserver",
        "address",
        "as_number",
        "as_description",
        "country_code",
        "range_start",
        "range_end",
        "belonging_network",
    ])?;
    let mut rows = 0;
    for (nameserver, record) in results.as_results.iter() {
        let entry = record.entry.as_ref();
        wtr.write_record([
            nameserver.to_string(),
            opt(record.address),
            opt(entry.map(|e| e.number)),
            opt(entry.map(|e| e.description.as_str())),
            opt(entry.map(|e| e.country_code.as_str())),
            opt(entry.map(|e| e.start)),
            opt(entry.map(|e| e.end)),
            opt(record.belonging_network),
        ])?;
        rows += 1;
    }
    wtr.flush()?;
    Ok(rows)
}

/// One row per nameserver of every AS that went through the cross-check.
pub fn write_rov_csv<W: Write>(results: &MappingResults, writer: W) -> csv::Result<usize> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["as_number", "nameserver", "address", "prefix", "rov_state"])?;
    let mut rows = 0;
    for (as_number, nameservers) in &results.rov {
        for (nameserver, entry) in nameservers {
            let prefix = entry.prefix.as_ref();
            wtr.write_record([
                as_number.to_string(),
                nameserver.to_string(),
                opt(entry.address),
                opt(prefix.map(|p| p.prefix)),
                opt(prefix.map(|p| p.rov_state.as_str())),
            ])?;
            rows += 1;
        }
    }
    wtr.flush()?;
    Ok(rows)
}

/// Mail domain to mail server, one row per server.
pub fn write_mail_csv<W: Write>(results: &MappingResults, writer: W) -> csv::Result<usize> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["mail_domain", "mail_server"])?;
    let mut rows = 0;
    for (domain, servers) in &results.mail_domains {
        if servers.is_empty() {
            wtr.write_record([domain.as_str(), ""])?;
            rows += 1;
        }
        for server in servers {
            wtr.write_record([domain.as_str(), server.as_str()])?;
            rows += 1;
        }
    }
    wtr.flush()?;
    Ok(rows)
}

/// Web site to script to hosting site.
pub fn write_scripts_csv<W: Write>(results: &MappingResults, writer: W) -> csv::Result<usize> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["web_site", "script", "integrity", "hosting_site"])?;
    let mut rows = 0;
    for (site, scripts) in &results.scripts.per_site {
        for script in scripts {
            let integrity = script.integrity.as_deref().unwrap_or_default();
            let hosts = results.scripts.hosting_sites.get(&script.src);
            match hosts {
                Some(hosts) if !hosts.is_empty() => {
                    for host in hosts {
                        wtr.write_record([
                            site.as_str(),
                            script.src.as_str(),
                            integrity,
                            host.as_str(),
                        ])?;
                        rows += 1;
                    }
                }
                _ => {
                    wtr.write_record([site.as_str(), script.src.as_str(), integrity, ""])?;
                    rows += 1;
                }
            }
        }
    }
    wtr.flush()?;
    Ok(rows)
}
