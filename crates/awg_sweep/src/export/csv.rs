use crate::report::SweepRecord;

fn optional_ms(value: Option<f64>) -> String {
    value.map(|ms| format!("{ms:.3}")).unwrap_or_default()
}

pub(crate) fn export_to_csv_impl(
    records: &[SweepRecord],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "template",
        "combination_id",
        "jc",
        "jmin",
        "jmax",
        "s1",
        "s2",
        "h1",
        "h2",
        "h3",
        "h4",
        "success",
        "handshake",
        "ping_avg_ms",
        "ping_min_ms",
        "ping_max_ms",
        "packet_loss_percent",
        "packets_sent",
        "packets_received",
        "failure",
        "error",
        "timestamp",
    ])?;

    for record in records {
        let params = &record.set.params;
        let result = &record.result;
        let handshake = result
            .handshake
            .map(|handshake| handshake.to_string())
            .unwrap_or_default();

        let row = vec![
            record.template.clone(),
            record.set.combination_id.clone(),
            params.jc.to_string(),
            params.jmin.to_string(),
            params.jmax.to_string(),
            params.s1.to_string(),
            params.s2.to_string(),
            params.h1.to_string(),
            params.h2.to_string(),
            params.h3.to_string(),
            params.h4.to_string(),
            result.success.to_string(),
            handshake,
            optional_ms(result.rtt.map(|rtt| rtt.avg_ms)),
            optional_ms(result.rtt.map(|rtt| rtt.min_ms)),
            optional_ms(result.rtt.map(|rtt| rtt.max_ms)),
            format!("{:.1}", result.packet_loss_percent),
            result.packets_sent.to_string(),
            result.packets_received.to_string(),
            result
                .failure
                .map(|reason| reason.as_str().to_string())
                .unwrap_or_default(),
            result.error.clone().unwrap_or_default(),
            record.timestamp.to_rfc3339(),
        ];
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
