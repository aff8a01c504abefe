//! Push channel announcing that a district's records changed.

use futures_lite::stream::StreamExt;
use lapin::{options::*, types::FieldTable, Connection, ConnectionProperties, Consumer};
use log::{error, info, warn};
use secrecy::ExposeSecret;
use std::time::Instant;

use crate::backend::MetricsBackend;
use crate::configuration::NotificationSettings;
use crate::geocoding::ReverseGeocoder;
use crate::location::LocationSource;
use crate::models::DistrictUpdate;
use crate::session::Session;

pub fn parse_update(data: &[u8]) -> Result<DistrictUpdate, serde_json::Error> {
    serde_json::from_slice(data)
}

/// The connection is returned alongside the consumer and must outlive it.
pub async fn connect(settings: &NotificationSettings) -> lapin::Result<(Connection, Consumer)> {
    let start_connection = Instant::now();
    let conn = Connection::connect(
        settings.connection_string().expose_secret(),
        ConnectionProperties::default(),
    )
    .await?;
    info!("Connected to {} in {:?}", settings.host, start_connection.elapsed());

    let channel = conn.create_channel().await?;
    let queue = channel
        .queue_declare(&settings.queue, QueueDeclareOptions::default(), FieldTable::default())
        .await?;
    info!("Declared queue {}", queue.name());

    let consumer = channel
        .basic_consume(
            &settings.queue,
            "district_insights_consumer",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;
    Ok((conn, consumer))
}

/// Refreshes the session's history whenever its selected district is announced.
///
/// Undecodable messages are logged and acknowledged so they do not redeliver.
pub async fn run_consumer<B, G, L>(consumer: &mut Consumer, session: &Session<B, G, L>) -> lapin::Result<()>
where
    B: MetricsBackend,
    G: ReverseGeocoder,
    L: LocationSource,
{
    while let Some(delivery) = consumer.next().await {
        let delivery = delivery?;
        match parse_update(&delivery.data) {
            Ok(update) => match session.refresh_district(update.district_id).await {
                Ok(true) => info!("Refreshed district {} after update", update.district_id),
                Ok(false) => {}
                Err(e) => error!("Refresh after update failed: {}", e),
            },
            Err(e) => warn!(
                "Ignoring malformed update {:?}: {}",
                String::from_utf8_lossy(&delivery.data),
                e
            ),
        }
        delivery.ack(BasicAckOptions::default()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_string_codes() {
        assert_eq!(parse_update(br#"{"district_code": 1601}"#).unwrap().district_id, 1601);
        assert_eq!(parse_update(br#"{"district_code": "1601", "reason": "sync"}"#).unwrap().district_id, 1601);
    }

    #[test]
    fn rejects_messages_without_a_district() {
        assert!(parse_update(b"{}").is_err());
        assert!(parse_update(b"refresh everything").is_err());
    }
}
