use near_plugins::{AccessControllable, access_control_any};
use near_sdk::{AccountId, env, json_types::U64, log, near};
use vcred_near_utils::PREDECESSOR_ACCOUNT_ID;
use vcred_services_core::{Error, ExecutionState};

use crate::{Contract, ContractExt, Role};

#[near(serializers = [json])]
#[derive(Debug, Clone)]
pub struct ExecutionView {
    pub state: ExecutionState,
    pub requester: AccountId,
    pub last_update_ts: U64,
}

#[near]
impl Contract {
    /// `createService(serviceType, vid, creditsCost)`.
    pub fn create_service(
        &mut self,
        service_type: String,
        visibility_id: String,
        credits_cost: u64,
    ) -> Result<U64, Error> {
        let caller = PREDECESSOR_ACCOUNT_ID.clone();
        let nonce =
            self.services
                .create_service(&caller, &self.credits, service_type, visibility_id, credits_cost)?;
        Ok(U64(nonce))
    }

    /// `updateService(nonce, enabled)`.
    pub fn update_service(&mut self, nonce: U64, enabled: bool) -> Result<(), Error> {
        let caller = PREDECESSOR_ACCOUNT_ID.clone();
        self.services.update_service(&caller, &self.credits, nonce.0, enabled)
    }

    /// `requestServiceExecution(nonce, requestData)`. Escrows
    /// `service.credits_cost` from the caller via the Credits Engine.
    pub fn request_service_execution(
        &mut self,
        nonce: U64,
        request_data: String,
    ) -> Result<U64, Error> {
        let requester = PREDECESSOR_ACCOUNT_ID.clone();
        let now = env::block_timestamp();
        let execution_nonce = self.services.request_service_execution(
            requester,
            &mut self.credits,
            nonce.0,
            request_data,
            now,
        )?;
        Ok(U64(execution_nonce))
    }

    /// `acceptServiceExecution(nonce, en, responseData)`.
    pub fn accept_service_execution(
        &mut self,
        nonce: U64,
        execution_nonce: U64,
        response_data: String,
    ) -> Result<(), Error> {
        let caller = PREDECESSOR_ACCOUNT_ID.clone();
        let now = env::block_timestamp();
        self.services.accept_service_execution(
            &caller,
            &self.credits,
            nonce.0,
            execution_nonce.0,
            response_data,
            now,
        )
    }

    /// `cancelServiceExecution(nonce, en, cancelData)`.
    pub fn cancel_service_execution(
        &mut self,
        nonce: U64,
        execution_nonce: U64,
        cancel_data: String,
    ) -> Result<(), Error> {
        let caller = PREDECESSOR_ACCOUNT_ID.clone();
        let now = env::block_timestamp();
        self.services.cancel_service_execution(
            &caller,
            &mut self.credits,
            nonce.0,
            execution_nonce.0,
            cancel_data,
            now,
        )
    }

    /// `validateServiceExecution(nonce, en)`.
    pub fn validate_service_execution(
        &mut self,
        nonce: U64,
        execution_nonce: U64,
    ) -> Result<(), Error> {
        let caller = PREDECESSOR_ACCOUNT_ID.clone();
        let now = env::block_timestamp();
        self.services
            .validate_service_execution(&caller, &mut self.credits, nonce.0, execution_nonce.0, now)
    }

    /// `disputeServiceExecution(nonce, en, disputeData)`.
    pub fn dispute_service_execution(
        &mut self,
        nonce: U64,
        execution_nonce: U64,
        dispute_data: String,
    ) -> Result<(), Error> {
        let caller = PREDECESSOR_ACCOUNT_ID.clone();
        let now = env::block_timestamp();
        self.services
            .dispute_service_execution(&caller, nonce.0, execution_nonce.0, dispute_data, now)
    }

    /// `resolveServiceExecution(nonce, en, refund, resolveData)`.
    #[access_control_any(roles(Role::DisputeResolver))]
    pub fn resolve_service_execution(
        &mut self,
        nonce: U64,
        execution_nonce: U64,
        refund: bool,
        resolve_data: String,
    ) -> Result<(), Error> {
        let now = env::block_timestamp();
        let result = self.services.resolve_service_execution(
            &mut self.credits,
            nonce.0,
            execution_nonce.0,
            refund,
            resolve_data,
            now,
        );
        log!(
            "resolveServiceExecution: service {} execution {} refund={}",
            nonce.0,
            execution_nonce.0,
            refund
        );
        result
    }

    /// `getServiceExecution(nonce, en)`.
    pub fn get_service_execution(&self, nonce: U64, execution_nonce: U64) -> Option<ExecutionView> {
        self.services
            .get_service_execution(nonce.0, execution_nonce.0)
            .map(|e| ExecutionView {
                state: e.state,
                requester: e.requester.clone(),
                last_update_ts: U64(e.last_update_ts),
            })
    }
}
