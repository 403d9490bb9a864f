//! Crypto service implementation.
//!
//! Handles record creation, listing, point reads, updates, deletes and the
//! four vote adjustments. Every handler parses its identifier first, so a
//! malformed id is always `INVALID_ARGUMENT` and never reaches the store.

use std::{sync::Arc, time::Instant};

use cryptovote_proto::proto::{
    AddDislikeRequest, AddDislikeResponse, AddLikeRequest, AddLikeResponse, CountVotesRequest,
    CountVotesResponse, CreateCryptoRequest, CreateCryptoResponse, DeleteCryptoRequest,
    DeleteCryptoResponse, FilterCryptosByNameRequest, ListCryptosRequest, ReadCryptoRequest,
    ReadCryptoResponse, RemoveDislikeRequest, RemoveDislikeResponse, RemoveLikeRequest,
    RemoveLikeResponse, UpdateCryptoRequest, UpdateCryptoResponse,
    crypto_service_server::CryptoService,
};
use cryptovote_store::{CryptoStore, ListQuery};
use cryptovote_types::{Crypto, CryptoUpdate, NewCrypto, VoteAdjustment};
use snafu::{OptionExt, ResultExt};
use tonic::{Request, Response, Status};
use tracing::{debug, info, instrument};

use super::helpers::{ListStream, finish, list_stream, parse_id};
use crate::{
    error::{NotFoundSnafu, ServiceError, StoreSnafu},
    metrics,
};

/// Crypto service implementation.
#[derive(Clone, bon::Builder)]
pub struct CryptoServiceImpl {
    /// Store holding the records.
    store: Arc<dyn CryptoStore>,
}

impl CryptoServiceImpl {
    async fn create(&self, req: CreateCryptoRequest) -> Result<Crypto, ServiceError> {
        let crypto = self
            .store
            .insert(NewCrypto::new(&req.name, &req.description))
            .await
            .context(StoreSnafu)?;
        info!(crypto_id = %crypto.id, name = %crypto.name, "Created crypto");
        Ok(crypto)
    }

    async fn read(&self, raw_id: &str) -> Result<Crypto, ServiceError> {
        let id = parse_id(raw_id)?;
        self.store.find_one(id).await.context(StoreSnafu)?.context(NotFoundSnafu { id })
    }

    async fn update(&self, req: UpdateCryptoRequest) -> Result<Crypto, ServiceError> {
        let id = parse_id(&req.id)?;
        let crypto = self
            .store
            .update(id, CryptoUpdate::new(&req.name, &req.description))
            .await
            .context(StoreSnafu)?
            .context(NotFoundSnafu { id })?;
        info!(crypto_id = %id, name = %crypto.name, "Updated crypto");
        Ok(crypto)
    }

    async fn delete(&self, raw_id: &str) -> Result<(), ServiceError> {
        let id = parse_id(raw_id)?;
        let deleted = self.store.delete_one(id).await.context(StoreSnafu)?;
        if !deleted {
            return NotFoundSnafu { id }.fail();
        }
        info!(crypto_id = %id, "Deleted crypto");
        Ok(())
    }

    async fn vote(&self, raw_id: &str, adjustment: VoteAdjustment) -> Result<Crypto, ServiceError> {
        let id = parse_id(raw_id)?;
        let crypto = self
            .store
            .adjust_votes(id, adjustment)
            .await
            .context(StoreSnafu)?
            .context(NotFoundSnafu { id })?;
        metrics::record_vote(adjustment);
        debug!(
            crypto_id = %id,
            vote = %adjustment,
            likes = crypto.likes,
            dislikes = crypto.dislikes,
            vote_rate = crypto.vote_rate,
            "Vote applied"
        );
        Ok(crypto)
    }

    async fn list(&self, method: &'static str, query: ListQuery) -> Result<ListStream, ServiceError> {
        let records = self.store.find_all(query).await.context(StoreSnafu)?;
        Ok(list_stream(method, records))
    }
}

#[tonic::async_trait]
impl CryptoService for CryptoServiceImpl {
    #[instrument(skip(self, request))]
    async fn create_crypto(
        &self,
        request: Request<CreateCryptoRequest>,
    ) -> Result<Response<CreateCryptoResponse>, Status> {
        let start = Instant::now();
        let result = self.create(request.into_inner()).await.map(|crypto| CreateCryptoResponse {
            success: true,
            crypto: Some(crypto.into()),
        });
        finish("CreateCrypto", start, result)
    }

    type ListCryptosStream = ListStream;

    #[instrument(skip(self, _request))]
    async fn list_cryptos(
        &self,
        _request: Request<ListCryptosRequest>,
    ) -> Result<Response<Self::ListCryptosStream>, Status> {
        let start = Instant::now();
        let result = self.list("ListCryptos", ListQuery::all()).await;
        finish("ListCryptos", start, result)
    }

    type FilterCryptosByNameStream = ListStream;

    #[instrument(skip(self, request), fields(filter = tracing::field::Empty))]
    async fn filter_cryptos_by_name(
        &self,
        request: Request<FilterCryptosByNameRequest>,
    ) -> Result<Response<Self::FilterCryptosByNameStream>, Status> {
        let start = Instant::now();
        let name = request.into_inner().name;
        tracing::Span::current().record("filter", name.as_str());

        let result = self.list("FilterCryptosByName", ListQuery::name_contains(name)).await;
        finish("FilterCryptosByName", start, result)
    }

    #[instrument(skip(self, request), fields(crypto_id = tracing::field::Empty))]
    async fn read_crypto(
        &self,
        request: Request<ReadCryptoRequest>,
    ) -> Result<Response<ReadCryptoResponse>, Status> {
        let start = Instant::now();
        let result = self
            .read(&request.into_inner().id)
            .await
            .map(|crypto| ReadCryptoResponse { crypto: Some(crypto.into()) });
        finish("ReadCrypto", start, result)
    }

    #[instrument(skip(self, request), fields(crypto_id = tracing::field::Empty))]
    async fn update_crypto(
        &self,
        request: Request<UpdateCryptoRequest>,
    ) -> Result<Response<UpdateCryptoResponse>, Status> {
        let start = Instant::now();
        let result = self.update(request.into_inner()).await.map(|crypto| UpdateCryptoResponse {
            success: true,
            crypto: Some(crypto.into()),
        });
        finish("UpdateCrypto", start, result)
    }

    #[instrument(skip(self, request), fields(crypto_id = tracing::field::Empty))]
    async fn delete_crypto(
        &self,
        request: Request<DeleteCryptoRequest>,
    ) -> Result<Response<DeleteCryptoResponse>, Status> {
        let start = Instant::now();
        let result = self
            .delete(&request.into_inner().id)
            .await
            .map(|()| DeleteCryptoResponse { success: true });
        finish("DeleteCrypto", start, result)
    }

    #[instrument(skip(self, request), fields(crypto_id = tracing::field::Empty))]
    async fn add_like(
        &self,
        request: Request<AddLikeRequest>,
    ) -> Result<Response<AddLikeResponse>, Status> {
        let start = Instant::now();
        let result = self
            .vote(&request.into_inner().id, VoteAdjustment::ADD_LIKE)
            .await
            .map(|crypto| AddLikeResponse { crypto: Some(crypto.into()) });
        finish("AddLike", start, result)
    }

    #[instrument(skip(self, request), fields(crypto_id = tracing::field::Empty))]
    async fn remove_like(
        &self,
        request: Request<RemoveLikeRequest>,
    ) -> Result<Response<RemoveLikeResponse>, Status> {
        let start = Instant::now();
        let result = self
            .vote(&request.into_inner().id, VoteAdjustment::REMOVE_LIKE)
            .await
            .map(|crypto| RemoveLikeResponse { crypto: Some(crypto.into()) });
        finish("RemoveLike", start, result)
    }

    #[instrument(skip(self, request), fields(crypto_id = tracing::field::Empty))]
    async fn add_dislike(
        &self,
        request: Request<AddDislikeRequest>,
    ) -> Result<Response<AddDislikeResponse>, Status> {
        let start = Instant::now();
        let result = self
            .vote(&request.into_inner().id, VoteAdjustment::ADD_DISLIKE)
            .await
            .map(|crypto| AddDislikeResponse { crypto: Some(crypto.into()) });
        finish("AddDislike", start, result)
    }

    #[instrument(skip(self, request), fields(crypto_id = tracing::field::Empty))]
    async fn remove_dislike(
        &self,
        request: Request<RemoveDislikeRequest>,
    ) -> Result<Response<RemoveDislikeResponse>, Status> {
        let start = Instant::now();
        let result = self
            .vote(&request.into_inner().id, VoteAdjustment::REMOVE_DISLIKE)
            .await
            .map(|crypto| RemoveDislikeResponse { crypto: Some(crypto.into()) });
        finish("RemoveDislike", start, result)
    }

    #[instrument(skip(self, request), fields(crypto_id = tracing::field::Empty))]
    async fn count_votes(
        &self,
        request: Request<CountVotesRequest>,
    ) -> Result<Response<CountVotesResponse>, Status> {
        let start = Instant::now();
        let result = self
            .read(&request.into_inner().id)
            .await
            .map(|crypto| CountVotesResponse { total: crypto.total_votes(), name: crypto.name });
        finish("CountVotes", start, result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use cryptovote_proto::proto;
    use cryptovote_store::InMemoryCryptoStore;
    use cryptovote_types::CryptoId;
    use futures::StreamExt;

    use super::*;

    fn service() -> (CryptoServiceImpl, Arc<InMemoryCryptoStore>) {
        let store = Arc::new(InMemoryCryptoStore::new());
        (CryptoServiceImpl::builder().store(store.clone()).build(), store)
    }

    async fn create(service: &CryptoServiceImpl, name: &str, description: &str) -> proto::Crypto {
        service
            .create_crypto(Request::new(CreateCryptoRequest {
                name: name.to_owned(),
                description: description.to_owned(),
            }))
            .await
            .unwrap()
            .into_inner()
            .crypto
            .unwrap()
    }

    async fn like(service: &CryptoServiceImpl, id: &str) -> proto::Crypto {
        service
            .add_like(Request::new(AddLikeRequest { id: id.to_owned() }))
            .await
            .unwrap()
            .into_inner()
            .crypto
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_normalizes_and_zeroes() {
        let (service, _) = service();
        let created = create(&service, "bitcoin", "digital money").await;

        assert_eq!(created.name, "BITCOIN");
        assert_eq!(created.description, "Digital Money");
        assert_eq!(created.likes, 0);
        assert_eq!(created.dislikes, 0);
        assert_eq!(created.vote_rate, 0);
        assert_eq!(created.id.len(), 24);
    }

    #[tokio::test]
    async fn test_create_store_failure_is_internal() {
        let (service, store) = service();
        store.fail_writes(true);
        let status = service
            .create_crypto(Request::new(CreateCryptoRequest {
                name: "x".to_owned(),
                description: String::new(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Internal);
    }

    #[tokio::test]
    async fn test_like_sequence() {
        let (service, _) = service();
        let id = create(&service, "bitcoin", "").await.id;
        for _ in 0..3 {
            like(&service, &id).await;
        }
        let after = service
            .remove_like(Request::new(RemoveLikeRequest { id: id.clone() }))
            .await
            .unwrap()
            .into_inner()
            .crypto
            .unwrap();

        assert_eq!(after.likes, 2);
        assert_eq!(after.vote_rate, 2);
    }

    #[tokio::test]
    async fn test_remove_dislike_at_zero_stays_zero() {
        let (service, _) = service();
        let id = create(&service, "eth", "").await.id;
        let after = service
            .remove_dislike(Request::new(RemoveDislikeRequest { id }))
            .await
            .unwrap()
            .into_inner()
            .crypto
            .unwrap();
        assert_eq!(after.dislikes, 0);
        assert_eq!(after.vote_rate, 0);
    }

    #[tokio::test]
    async fn test_count_votes_sums_counters() {
        let (service, _) = service();
        let id = create(&service, "eth", "").await.id;
        like(&service, &id).await;
        service
            .add_dislike(Request::new(AddDislikeRequest { id: id.clone() }))
            .await
            .unwrap();

        let count = service
            .count_votes(Request::new(CountVotesRequest { id }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(count.name, "ETH");
        assert_eq!(count.total, 2);
    }

    #[tokio::test]
    async fn test_malformed_and_missing_ids_are_distinguished() {
        let (service, _) = service();

        let malformed = service
            .read_crypto(Request::new(ReadCryptoRequest { id: "zzz".to_owned() }))
            .await
            .unwrap_err();
        assert_eq!(malformed.code(), tonic::Code::InvalidArgument);

        let missing_id = CryptoId::generate().to_string();
        let missing = service
            .read_crypto(Request::new(ReadCryptoRequest { id: missing_id.clone() }))
            .await
            .unwrap_err();
        assert_eq!(missing.code(), tonic::Code::NotFound);

        let vote = service
            .add_like(Request::new(AddLikeRequest { id: missing_id.clone() }))
            .await
            .unwrap_err();
        assert_eq!(vote.code(), tonic::Code::NotFound);

        let delete = service
            .delete_crypto(Request::new(DeleteCryptoRequest { id: missing_id }))
            .await
            .unwrap_err();
        assert_eq!(delete.code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn test_update_overwrites_text_fields() {
        let (service, _) = service();
        let created = create(&service, "eth", "old").await;
        like(&service, &created.id).await;

        let response = service
            .update_crypto(Request::new(UpdateCryptoRequest {
                id: created.id.clone(),
                name: "ether".to_owned(),
                description: "smart contracts".to_owned(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.success);
        let updated = response.crypto.unwrap();
        assert_eq!(updated.name, "ETHER");
        assert_eq!(updated.description, "Smart Contracts");
        assert_eq!(updated.likes, 1);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_delete_then_read_is_not_found() {
        let (service, store) = service();
        let id = create(&service, "eth", "").await.id;

        let response = service
            .delete_crypto(Request::new(DeleteCryptoRequest { id: id.clone() }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.success);
        assert!(store.is_empty());

        let status = service
            .read_crypto(Request::new(ReadCryptoRequest { id }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn test_list_orders_by_vote_rate() {
        let (service, _) = service();
        let top = create(&service, "top", "").await.id;
        let bottom = create(&service, "bottom", "").await.id;
        for _ in 0..5 {
            like(&service, &top).await;
        }
        service
            .add_dislike(Request::new(AddDislikeRequest { id: bottom }))
            .await
            .unwrap();

        let stream = service
            .list_cryptos(Request::new(ListCryptosRequest {}))
            .await
            .unwrap()
            .into_inner();
        let rates: Vec<i64> = stream
            .map(|item| item.unwrap().crypto.unwrap().vote_rate)
            .collect()
            .await;
        assert_eq!(rates, vec![5, -1]);
    }

    #[tokio::test]
    async fn test_filter_by_name() {
        let (service, _) = service();
        create(&service, "bitcoin", "").await;
        create(&service, "ethereum", "").await;

        let stream = service
            .filter_cryptos_by_name(Request::new(FilterCryptosByNameRequest {
                name: "bit".to_owned(),
            }))
            .await
            .unwrap()
            .into_inner();
        let names: Vec<String> =
            stream.map(|item| item.unwrap().crypto.unwrap().name).collect().await;
        assert_eq!(names, vec!["BITCOIN".to_owned()]);
    }

    #[tokio::test]
    async fn test_list_ends_on_scan_failure() {
        let (service, store) = service();
        for name in ["a", "b", "c"] {
            create(&service, name, "").await;
        }
        store.fail_next_scan_after(1);

        let items: Vec<Result<proto::ListCryptosResponse, Status>> = service
            .list_cryptos(Request::new(ListCryptosRequest {}))
            .await
            .unwrap()
            .into_inner()
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(items[1].as_ref().unwrap_err().code(), tonic::Code::Unavailable);
    }
}
