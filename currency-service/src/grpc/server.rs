//! gRPC server for the currency catalog
//!
//! Thin binding: validates input shape, maps wire messages to entity shapes,
//! invokes the catalog, and translates outcomes to gRPC status codes.
//! Decimal values travel as strings; timestamps as epoch milliseconds.

use crate::catalog::CurrencyCatalog;
use crate::error::Error;
use crate::metrics::Metrics;
use crate::types::{Currency, CurrencySnapshot, Denomination, DenominationSpec};
use crate::validation;
use revision_store::{Revision, RevisionAction, RevisionStatus, RevisionStore, Versioned};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tonic::{Request, Response, Status};

// Include generated protobuf code
#[allow(missing_docs)]
pub mod currencies {
    tonic::include_proto!("currencies");
}

use currencies::currency_catalog_server::CurrencyCatalog as CurrencyCatalogRpc;

/// gRPC server wrapping a [`CurrencyCatalog`]
pub struct CurrencyGrpcServer<CS, DS> {
    catalog: Arc<CurrencyCatalog<CS, DS>>,
    metrics: Metrics,
}

impl<CS, DS> CurrencyGrpcServer<CS, DS> {
    /// Create a server over the given catalog
    pub fn new(catalog: Arc<CurrencyCatalog<CS, DS>>, metrics: Metrics) -> Self {
        Self { catalog, metrics }
    }
}

fn to_status(err: Error) -> Status {
    match err {
        Error::Validation(msg) => Status::invalid_argument(msg),
        Error::NotFound(msg) => Status::not_found(msg),
        Error::Storage(msg) | Error::Internal(msg) => {
            tracing::error!(error = %msg, "Internal failure");
            Status::internal(msg)
        }
    }
}

fn parse_specs(denominations: &[currencies::Denomination]) -> Result<Vec<DenominationSpec>, Status> {
    let mut specs = Vec::with_capacity(denominations.len());
    for denomination in denominations {
        let value = Decimal::from_str(&denomination.value)
            .map_err(|e| Status::invalid_argument(format!("Invalid value: {e}")))?;
        specs.push(DenominationSpec {
            value,
            description: denomination.description.clone(),
        });
    }

    let tuples: Vec<(Decimal, Option<String>)> = specs
        .iter()
        .map(|s| (s.value, s.description.clone()))
        .collect();
    validation::validate_denominations(&tuples).map_err(to_status)?;

    Ok(specs)
}

fn action_to_proto(action: RevisionAction) -> i32 {
    match action {
        RevisionAction::Created => currencies::RevisionAction::Created as i32,
        RevisionAction::Updated => currencies::RevisionAction::Updated as i32,
        RevisionAction::Deleted => currencies::RevisionAction::Deleted as i32,
        RevisionAction::Restored => currencies::RevisionAction::Restored as i32,
        RevisionAction::Unmodified => currencies::RevisionAction::Unmodified as i32,
    }
}

fn status_to_proto(status: RevisionStatus) -> i32 {
    match status {
        RevisionStatus::Active => currencies::RevisionStatus::Active as i32,
        RevisionStatus::Superseded => currencies::RevisionStatus::Superseded as i32,
    }
}

fn revision_to_proto(revision: &Revision) -> currencies::Revision {
    currencies::Revision {
        number: revision.number,
        created_at: revision.created_at.timestamp_millis(),
        action: action_to_proto(revision.action),
        status: status_to_proto(revision.status),
    }
}

fn denomination_to_proto(denomination: &Versioned<Denomination>) -> currencies::DenominationResponse {
    currencies::DenominationResponse {
        key: denomination.key().to_string(),
        value: denomination.entity.value.to_string(),
        description: denomination.entity.description.clone(),
        revision: Some(revision_to_proto(&denomination.revision)),
    }
}

fn snapshot_to_proto(snapshot: CurrencySnapshot) -> currencies::CurrencyResponse {
    currencies::CurrencyResponse {
        key: snapshot.currency.key().to_string(),
        name: snapshot.currency.entity.name.clone(),
        code: snapshot.currency.entity.code.clone(),
        symbol: snapshot.currency.entity.symbol.clone(),
        revision: Some(revision_to_proto(&snapshot.currency.revision)),
        denominations: snapshot
            .denominations
            .iter()
            .map(denomination_to_proto)
            .collect(),
    }
}

fn written_revisions(snapshot: &CurrencySnapshot) -> usize {
    let currency = usize::from(snapshot.currency.revision.action != RevisionAction::Unmodified);
    currency
        + snapshot
            .denominations
            .iter()
            .filter(|d| d.revision.action != RevisionAction::Unmodified)
            .count()
}

#[tonic::async_trait]
impl<CS, DS> CurrencyCatalogRpc for CurrencyGrpcServer<CS, DS>
where
    CS: RevisionStore<Currency> + 'static,
    DS: RevisionStore<Denomination> + 'static,
{
    async fn create_currency(
        &self,
        request: Request<currencies::Currency>,
    ) -> Result<Response<currencies::CurrencyResponse>, Status> {
        let started = Instant::now();
        let req = request.into_inner();

        tracing::info!(name = %req.name, "Handling CreateCurrency");

        validation::validate_currency(&req.name, &req.code, req.symbol.as_deref())
            .map_err(to_status)?;
        let specs = parse_specs(&req.denominations)?;

        let currency = Currency {
            name: req.name,
            code: req.code,
            symbol: req.symbol,
        };

        let snapshot = self
            .catalog
            .create(currency, specs)
            .await
            .map_err(to_status)?;

        self.metrics.record_revisions_written(written_revisions(&snapshot));
        self.metrics.record_request(started.elapsed().as_secs_f64());
        Ok(Response::new(snapshot_to_proto(snapshot)))
    }

    async fn update_currency(
        &self,
        request: Request<currencies::CurrencyActionRequest>,
    ) -> Result<Response<currencies::CurrencyResponse>, Status> {
        let started = Instant::now();
        let req = request.into_inner();

        tracing::info!(key = %req.key, "Handling UpdateCurrency");

        let key = validation::parse_key(&req.key).map_err(to_status)?;
        let body = req
            .currency
            .ok_or_else(|| Status::invalid_argument("currency body is required"))?;
        validation::validate_currency(&body.name, &body.code, body.symbol.as_deref())
            .map_err(to_status)?;
        let specs = parse_specs(&body.denominations)?;

        let currency = Currency {
            name: body.name,
            code: body.code,
            symbol: body.symbol,
        };

        let snapshot = self
            .catalog
            .update(key, currency, specs)
            .await
            .map_err(to_status)?;

        self.metrics.record_revisions_written(written_revisions(&snapshot));
        self.metrics.record_request(started.elapsed().as_secs_f64());
        Ok(Response::new(snapshot_to_proto(snapshot)))
    }

    async fn delete_currency(
        &self,
        request: Request<currencies::CurrencyRequest>,
    ) -> Result<Response<currencies::CurrencyResponse>, Status> {
        let started = Instant::now();
        let req = request.into_inner();

        tracing::info!(key = %req.key, "Handling DeleteCurrency");

        let key = validation::parse_key(&req.key).map_err(to_status)?;
        let snapshot = self.catalog.delete(key).await.map_err(to_status)?;

        self.metrics.record_revisions_written(written_revisions(&snapshot));
        self.metrics.record_request(started.elapsed().as_secs_f64());
        Ok(Response::new(snapshot_to_proto(snapshot)))
    }

    async fn get_currency(
        &self,
        request: Request<currencies::CurrencyRequest>,
    ) -> Result<Response<currencies::CurrencyResponse>, Status> {
        let started = Instant::now();
        let req = request.into_inner();

        let key = validation::parse_key(&req.key).map_err(to_status)?;
        let snapshot = self.catalog.get(key).await.map_err(to_status)?;

        self.metrics.record_request(started.elapsed().as_secs_f64());
        Ok(Response::new(snapshot_to_proto(snapshot)))
    }

    async fn get_all_currencies(
        &self,
        _request: Request<currencies::EmptyRequest>,
    ) -> Result<Response<currencies::CurrencyListResponse>, Status> {
        let started = Instant::now();

        let snapshots = self.catalog.get_all().await.map_err(to_status)?;

        self.metrics.record_request(started.elapsed().as_secs_f64());
        Ok(Response::new(currencies::CurrencyListResponse {
            currencies: snapshots.into_iter().map(snapshot_to_proto).collect(),
        }))
    }

    async fn get_all_currencies_filtered(
        &self,
        request: Request<currencies::GetAllCurrenciesFilteredRequest>,
    ) -> Result<Response<currencies::CurrencyListResponse>, Status> {
        let started = Instant::now();
        let req = request.into_inner();

        let snapshots = self
            .catalog
            .get_all_by_name(&req.name)
            .await
            .map_err(to_status)?;

        self.metrics.record_request(started.elapsed().as_secs_f64());
        Ok(Response::new(currencies::CurrencyListResponse {
            currencies: snapshots.into_iter().map(snapshot_to_proto).collect(),
        }))
    }

    async fn get_currency_revision(
        &self,
        request: Request<currencies::GetCurrencyRevisionRequest>,
    ) -> Result<Response<currencies::CurrencyResponse>, Status> {
        let started = Instant::now();
        let req = request.into_inner();

        let key = validation::parse_key(&req.key).map_err(to_status)?;
        let at = chrono::DateTime::from_timestamp_millis(req.created_at)
            .ok_or_else(|| Status::invalid_argument("created_at is out of range"))?;

        let snapshot = self
            .catalog
            .get_revision(key, at)
            .await
            .map_err(to_status)?;

        self.metrics.record_request(started.elapsed().as_secs_f64());
        Ok(Response::new(snapshot_to_proto(snapshot)))
    }

    async fn get_all_currency_revisions(
        &self,
        request: Request<currencies::CurrencyRequest>,
    ) -> Result<Response<currencies::CurrencyListResponse>, Status> {
        let started = Instant::now();
        let req = request.into_inner();

        tracing::info!(key = %req.key, "Handling GetAllCurrencyRevisions");

        let key = validation::parse_key(&req.key).map_err(to_status)?;
        let history = self
            .catalog
            .get_all_revisions(key)
            .await
            .map_err(to_status)?;

        self.metrics.record_request(started.elapsed().as_secs_f64());
        Ok(Response::new(currencies::CurrencyListResponse {
            currencies: history.into_iter().map(snapshot_to_proto).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_error_to_status_mapping() {
        assert_eq!(
            to_status(Error::Validation("bad".to_string())).code(),
            tonic::Code::InvalidArgument
        );
        assert_eq!(
            to_status(Error::NotFound("missing".to_string())).code(),
            tonic::Code::NotFound
        );
        assert_eq!(
            to_status(Error::Storage("disk".to_string())).code(),
            tonic::Code::Internal
        );
    }

    #[test]
    fn test_parse_specs_rejects_bad_decimal() {
        let bad = vec![currencies::Denomination {
            value: "one".to_string(),
            description: None,
        }];
        assert!(parse_specs(&bad).is_err());
    }

    #[test]
    fn test_parse_specs_rejects_duplicates() {
        let dup = vec![
            currencies::Denomination {
                value: "1.00".to_string(),
                description: None,
            },
            currencies::Denomination {
                value: "1".to_string(),
                description: None,
            },
        ];
        assert!(parse_specs(&dup).is_err());
    }

    #[test]
    fn test_revision_round_trips_to_proto() {
        let revision = Revision {
            key: Uuid::new_v4(),
            number: 3,
            created_at: Utc::now(),
            action: RevisionAction::Restored,
            status: RevisionStatus::Active,
        };

        let proto = revision_to_proto(&revision);
        assert_eq!(proto.number, 3);
        assert_eq!(proto.action, currencies::RevisionAction::Restored as i32);
        assert_eq!(proto.status, currencies::RevisionStatus::Active as i32);
        assert_eq!(proto.created_at, revision.created_at.timestamp_millis());
    }
}
