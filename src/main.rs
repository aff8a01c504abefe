use std::time::{Duration, Instant};

use district_insights::backend::HttpBackend;
use district_insights::comparison::ComparisonPanel;
use district_insights::configuration::get_configuration;
use district_insights::geocoding::Geocoder;
use district_insights::location::FixedLocation;
use district_insights::models::{TOTAL_INDIVIDUALS_WORKED, WAGES};
use district_insights::notifications;
use district_insights::resolver::LocationResolver;
use district_insights::{Error, Session};
use log::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let start = Instant::now();
    let configuration = get_configuration()?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(configuration.backend.timeout_secs))
        .user_agent(configuration.geocoding.user_agent.clone())
        .build()?;
    let geocoder = Geocoder::from_settings(&configuration.geocoding, client.clone());
    info!("Using the {} geocoding provider", geocoder.provider_name());

    let session = Session::new(
        HttpBackend::new(client, configuration.backend.base_url.clone()),
        LocationResolver::new(geocoder, FixedLocation::from_settings(&configuration.device)),
    );
    session.start().await;
    if let Some(notice) = session.notice() {
        info!("{}", notice);
    }
    info!("Dashboard ready in {:?}", start.elapsed());

    match (session.selected(), session.latest()) {
        (Some(district), Some(latest)) => info!(
            "{} in {}: {} workers, {} wages",
            district,
            latest.label(),
            latest.metric_or_zero(TOTAL_INDIVIDUALS_WORKED),
            latest.metric_or_zero(WAGES)
        ),
        (Some(district), None) => info!("{} has no monthly data yet", district),
        _ => info!("No district selected"),
    }

    let mut panel = ComparisonPanel::new();
    for &id in &configuration.dashboard.compare {
        panel.toggle(id);
    }
    if !panel.selection().is_empty() {
        match panel.run(session.backend()).await {
            Ok(rows) => {
                for row in rows {
                    info!(
                        "{}: {} workers, {} wages",
                        row.district_name.as_deref().unwrap_or("unnamed district"),
                        row.metric_or_zero(TOTAL_INDIVIDUALS_WORKED),
                        row.metric_or_zero(WAGES)
                    );
                }
            }
            Err(e) => error!("{}", e),
        }
    }

    if configuration.notifications.enabled {
        let (_connection, mut consumer) = notifications::connect(&configuration.notifications).await?;
        tokio::select! {
            result = notifications::run_consumer(&mut consumer, &session) => {
                result?;
                info!("update consumer finished");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
            }
        }
    }
    session.close();

    Ok(())
}
