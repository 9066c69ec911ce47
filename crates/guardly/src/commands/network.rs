//! DNS server settings and DHCP leases.

use tabled::Tabled;

use guardly_core::model::{DhcpLease, DnsConfig, DnsConfigUpdate};
use guardly_core::{Command as CoreCommand, Controller};

use crate::cli::{DhcpArgs, DhcpCommand, DnsArgs, DnsCommand, DnsSetArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── DNS ─────────────────────────────────────────────────────────────

fn dns_detail(d: &DnsConfig) -> String {
    [
        format!("Upstreams:     {}", util::join_or_dash(&d.upstream_dns)),
        format!("Bootstrap:     {}", util::join_or_dash(&d.bootstrap_dns)),
        format!("Rate limit:    {}/s", d.ratelimit),
        format!("Blocking mode: {}", d.blocking_mode),
        format!("EDNS CS:       {}", output::yes_no(d.edns_cs_enabled)),
        format!("DNSSEC:        {}", output::yes_no(d.dnssec_enabled)),
        format!(
            "Cache:         {} ({} bytes, ttl {}-{})",
            if d.cache_active() { "on" } else { "off" },
            d.cache_size,
            d.cache_ttl_min,
            d.cache_ttl_max
        ),
    ]
    .join("\n")
}

fn dns_update(args: &DnsSetArgs) -> DnsConfigUpdate {
    let non_empty = |v: &Vec<String>| (!v.is_empty()).then(|| v.clone());
    DnsConfigUpdate {
        upstream_dns: non_empty(&args.upstreams),
        bootstrap_dns: non_empty(&args.bootstraps),
        ratelimit: args.ratelimit,
        blocking_mode: args.blocking_mode.clone(),
        edns_cs_enabled: args.edns_cs,
        dnssec_enabled: args.dnssec,
        cache_size: args.cache_size,
        cache_ttl_min: args.cache_ttl_min,
        cache_ttl_max: args.cache_ttl_max,
        cache_enabled: args.cache_enabled,
    }
}

pub async fn dns(
    controller: &Controller,
    args: &DnsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match &args.command {
        DnsCommand::Show => {
            let snap = controller.snapshot();
            let config = snap.dns.get().cloned().unwrap_or_default();
            let out = output::render_single(global.output(), &config, dns_detail, |d| {
                d.upstream_dns.join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DnsCommand::Set(set) => {
            controller
                .execute(CoreCommand::UpdateDnsConfig(dns_update(set)))
                .await?;
            output::print_done("DNS settings updated", global.quiet);
            Ok(())
        }
    }
}

// ── DHCP ────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct LeaseRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&DhcpLease> for LeaseRow {
    fn from(l: &DhcpLease) -> Self {
        Self {
            mac: l.mac.clone(),
            ip: l.ip.clone(),
            hostname: l.hostname.clone(),
            expires: l.expires.clone().unwrap_or_else(|| "static".into()),
        }
    }
}

pub fn dhcp(controller: &Controller, args: &DhcpArgs, global: &GlobalOpts) {
    match &args.command {
        DhcpCommand::Leases { static_only } => {
            let snap = controller.snapshot();
            let leases: Vec<DhcpLease> = snap
                .dhcp
                .get()
                .map(|status| {
                    let dynamic = if *static_only { &[][..] } else { &status.leases[..] };
                    dynamic
                        .iter()
                        .chain(status.static_leases.iter())
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            let out = output::render_list(global.output(), &leases, |x| LeaseRow::from(x), |l| {
                l.ip.clone()
            });
            output::print_output(&out, global.quiet);
        }
    }
}
