use near_sdk::{
    AccountId, BorshStorageKey, IntoStorageKey,
    borsh::BorshSerialize,
    near,
    store::LookupMap,
};
use vcred_credits_core::CreditsEngine;
use vcred_near_utils::{CURRENT_ACCOUNT_ID, NestPrefix};

use crate::{
    error::{Error, Result},
    event::{
        ServiceCreated, ServiceExecutionAccepted, ServiceExecutionCanceled,
        ServiceExecutionDisputed, ServiceExecutionRequested, ServiceExecutionResolved,
        ServiceExecutionValidated, ServiceUpdated, ServicesEventEmit,
    },
    state::{AUTO_VALIDATION_DELAY_NANOS, Execution, ExecutionState, Service},
};

#[near(serializers = [borsh])]
#[derive(Debug)]
pub struct ServicesEngine {
    services: LookupMap<u64, Service>,
    next_service_nonce: u64,
    storage_prefix: Vec<u8>,
}

impl ServicesEngine {
    pub fn new<S>(prefix: S) -> Self
    where
        S: IntoStorageKey,
    {
        let storage_prefix = prefix.into_storage_key();
        Self {
            services: LookupMap::new(storage_prefix.clone().nest(Prefix::Services)),
            next_service_nonce: 0,
            storage_prefix,
        }
    }

    pub fn get_service(&self, nonce: u64) -> Option<&Service> {
        self.services.get(&nonce)
    }

    pub fn get_service_execution(&self, nonce: u64, execution_nonce: u64) -> Option<&Execution> {
        self.services.get(&nonce)?.executions.get(&execution_nonce)
    }

    /// Credits held in escrow between request and settlement live under the
    /// contract's own account in the bound visibility's balance book, since
    /// both engines are wired into the same deployed contract, so this is an
    /// ordinary entry in `credit_balances`, not a separate lock.
    fn escrow_account() -> AccountId {
        CURRENT_ACCOUNT_ID.clone()
    }

    fn live_creator(credits: &CreditsEngine, vid: &str) -> Option<AccountId> {
        let key = credits.visibility_key(vid);
        credits.get_visibility(&key)?.creator.clone()
    }

    /// `createService(serviceType, vid, creditsCost)`.
    pub fn create_service(
        &mut self,
        caller: &AccountId,
        credits: &CreditsEngine,
        service_type: String,
        visibility_id: String,
        credits_cost: u64,
    ) -> Result<u64> {
        let creator = Self::live_creator(credits, &visibility_id);
        if creator.as_ref() != Some(caller) {
            return Err(Error::InvalidCreator);
        }

        let nonce = self.next_service_nonce;
        self.next_service_nonce += 1;

        let service = Service::new(
            self.storage_prefix.clone().nest(Prefix::ServiceRows).nest(nonce),
            service_type.clone(),
            visibility_id.clone(),
            credits_cost,
        );
        self.services.insert(nonce, service);

        ServiceCreated {
            nonce,
            service_type,
            visibility_id,
            credits_cost_amount: credits_cost,
        }
        .emit();

        Ok(nonce)
    }

    /// `updateService(nonce, enabled)`.
    pub fn update_service(
        &mut self,
        caller: &AccountId,
        credits: &CreditsEngine,
        nonce: u64,
        enabled: bool,
    ) -> Result<()> {
        let service = self.services.get(&nonce).ok_or(Error::InvalidExecutionState)?;
        let creator = Self::live_creator(credits, &service.visibility_id);
        if creator.as_ref() != Some(caller) {
            return Err(Error::InvalidCreator);
        }

        self.services.get_mut(&nonce).unwrap_or_else(|| unreachable!()).enabled = enabled;

        ServiceUpdated { nonce, enabled }.emit();
        Ok(())
    }

    /// `requestServiceExecution(nonce, requestData)`. Escrows
    /// `service.credits_cost` from `requester` via the Credits Engine.
    pub fn request_service_execution(
        &mut self,
        requester: AccountId,
        credits: &mut CreditsEngine,
        nonce: u64,
        request_data: String,
        now: u64,
    ) -> Result<u64> {
        let service = self.services.get(&nonce).ok_or(Error::InvalidExecutionState)?;
        if !service.enabled {
            return Err(Error::DisabledService);
        }
        let visibility_id = service.visibility_id.clone();
        let credits_cost = service.credits_cost;
        let execution_nonce = service.executions_nonce;

        credits.transfer_credits(&visibility_id, requester.clone(), Self::escrow_account(), credits_cost)?;

        let service = self.services.get_mut(&nonce).unwrap_or_else(|| unreachable!());
        service.executions_nonce += 1;
        service.executions.insert(
            execution_nonce,
            Execution {
                state: ExecutionState::Requested,
                requester: requester.clone(),
                last_update_ts: now,
            },
        );

        ServiceExecutionRequested {
            service_nonce: nonce,
            execution_nonce,
            requester,
            request_data,
        }
        .emit();

        Ok(execution_nonce)
    }

    /// `acceptServiceExecution(nonce, en, responseData)`. REQUESTED→ACCEPTED.
    pub fn accept_service_execution(
        &mut self,
        caller: &AccountId,
        credits: &CreditsEngine,
        nonce: u64,
        execution_nonce: u64,
        response_data: String,
        now: u64,
    ) -> Result<()> {
        let service = self.services.get(&nonce).ok_or(Error::InvalidExecutionState)?;
        let creator = Self::live_creator(credits, &service.visibility_id);
        if creator.as_ref() != Some(caller) {
            return Err(Error::UnauthorizedExecutionAction);
        }

        let execution = self
            .services
            .get_mut(&nonce)
            .unwrap_or_else(|| unreachable!())
            .executions
            .get_mut(&execution_nonce)
            .ok_or(Error::InvalidExecutionState)?;
        if execution.state != ExecutionState::Requested {
            return Err(Error::InvalidExecutionState);
        }
        execution.state = ExecutionState::Accepted;
        execution.last_update_ts = now;

        ServiceExecutionAccepted {
            service_nonce: nonce,
            execution_nonce,
            response_data,
        }
        .emit();
        Ok(())
    }

    /// `cancelServiceExecution(nonce, en, cancelData)`. REQUESTED→REFUNDED.
    pub fn cancel_service_execution(
        &mut self,
        caller: &AccountId,
        credits: &mut CreditsEngine,
        nonce: u64,
        execution_nonce: u64,
        cancel_data: String,
        now: u64,
    ) -> Result<()> {
        let service = self.services.get(&nonce).ok_or(Error::InvalidExecutionState)?;
        let visibility_id = service.visibility_id.clone();
        let credits_cost = service.credits_cost;
        let creator = Self::live_creator(credits, &visibility_id);

        let execution = self
            .services
            .get(&nonce)
            .unwrap_or_else(|| unreachable!())
            .executions
            .get(&execution_nonce)
            .ok_or(Error::InvalidExecutionState)?;
        if execution.state != ExecutionState::Requested {
            return Err(Error::InvalidExecutionState);
        }
        if caller != &execution.requester && creator.as_ref() != Some(caller) {
            return Err(Error::UnauthorizedExecutionAction);
        }
        let requester = execution.requester.clone();

        credits.transfer_credits(&visibility_id, Self::escrow_account(), requester.clone(), credits_cost)?;

        let execution = self
            .services
            .get_mut(&nonce)
            .unwrap_or_else(|| unreachable!())
            .executions
            .get_mut(&execution_nonce)
            .unwrap_or_else(|| unreachable!());
        execution.state = ExecutionState::Refunded;
        execution.last_update_ts = now;

        ServiceExecutionCanceled {
            service_nonce: nonce,
            execution_nonce,
            from: requester,
            cancel_data,
        }
        .emit();
        Ok(())
    }

    /// `validateServiceExecution(nonce, en)`. ACCEPTED→VALIDATED: pays
    /// escrow to the (live) creator, either on the requester's say-so or
    /// once [`AUTO_VALIDATION_DELAY_NANOS`] has elapsed since acceptance.
    pub fn validate_service_execution(
        &mut self,
        caller: &AccountId,
        credits: &mut CreditsEngine,
        nonce: u64,
        execution_nonce: u64,
        now: u64,
    ) -> Result<()> {
        let service = self.services.get(&nonce).ok_or(Error::InvalidExecutionState)?;
        let visibility_id = service.visibility_id.clone();
        let credits_cost = service.credits_cost;
        let creator = Self::live_creator(credits, &visibility_id).ok_or(Error::InvalidCreator)?;

        let execution = self
            .services
            .get(&nonce)
            .unwrap_or_else(|| unreachable!())
            .executions
            .get(&execution_nonce)
            .ok_or(Error::InvalidExecutionState)?;
        if execution.state != ExecutionState::Accepted {
            return Err(Error::InvalidExecutionState);
        }
        let past_auto_validation = now > execution.last_update_ts.saturating_add(AUTO_VALIDATION_DELAY_NANOS);
        if caller != &execution.requester && !past_auto_validation {
            return Err(Error::UnauthorizedExecutionAction);
        }

        credits.transfer_credits(&visibility_id, Self::escrow_account(), creator, credits_cost)?;

        let execution = self
            .services
            .get_mut(&nonce)
            .unwrap_or_else(|| unreachable!())
            .executions
            .get_mut(&execution_nonce)
            .unwrap_or_else(|| unreachable!());
        execution.state = ExecutionState::Validated;
        execution.last_update_ts = now;

        ServiceExecutionValidated {
            service_nonce: nonce,
            execution_nonce,
        }
        .emit();
        Ok(())
    }

    /// `disputeServiceExecution(nonce, en, disputeData)`. ACCEPTED→DISPUTED.
    pub fn dispute_service_execution(
        &mut self,
        caller: &AccountId,
        nonce: u64,
        execution_nonce: u64,
        dispute_data: String,
        now: u64,
    ) -> Result<()> {
        let execution = self
            .services
            .get_mut(&nonce)
            .ok_or(Error::InvalidExecutionState)?
            .executions
            .get_mut(&execution_nonce)
            .ok_or(Error::InvalidExecutionState)?;
        if execution.state != ExecutionState::Accepted {
            return Err(Error::InvalidExecutionState);
        }
        if caller != &execution.requester {
            return Err(Error::UnauthorizedExecutionAction);
        }
        execution.state = ExecutionState::Disputed;
        execution.last_update_ts = now;

        ServiceExecutionDisputed {
            service_nonce: nonce,
            execution_nonce,
            dispute_data,
        }
        .emit();
        Ok(())
    }

    /// `resolveServiceExecution(nonce, en, refund, resolveData)`.
    /// DISPUTED→REFUNDED (if `refund`) or →VALIDATED. Caller is gated by
    /// `DisputeResolver` at the contract binding layer.
    pub fn resolve_service_execution(
        &mut self,
        credits: &mut CreditsEngine,
        nonce: u64,
        execution_nonce: u64,
        refund: bool,
        resolve_data: String,
        now: u64,
    ) -> Result<()> {
        let service = self.services.get(&nonce).ok_or(Error::InvalidExecutionState)?;
        let visibility_id = service.visibility_id.clone();
        let credits_cost = service.credits_cost;

        let execution = self
            .services
            .get(&nonce)
            .unwrap_or_else(|| unreachable!())
            .executions
            .get(&execution_nonce)
            .ok_or(Error::InvalidExecutionState)?;
        if execution.state != ExecutionState::Disputed {
            return Err(Error::InvalidExecutionState);
        }
        let requester = execution.requester.clone();

        let (recipient, new_state) = if refund {
            (requester, ExecutionState::Refunded)
        } else {
            let creator = Self::live_creator(credits, &visibility_id).ok_or(Error::InvalidCreator)?;
            (creator, ExecutionState::Validated)
        };

        credits.transfer_credits(&visibility_id, Self::escrow_account(), recipient, credits_cost)?;

        let execution = self
            .services
            .get_mut(&nonce)
            .unwrap_or_else(|| unreachable!())
            .executions
            .get_mut(&execution_nonce)
            .unwrap_or_else(|| unreachable!());
        execution.state = new_state;
        execution.last_update_ts = now;

        ServiceExecutionResolved {
            service_nonce: nonce,
            execution_nonce,
            refund,
            resolve_data,
        }
        .emit();
        Ok(())
    }
}

#[derive(BorshSerialize, BorshStorageKey)]
#[borsh(crate = "::near_sdk::borsh")]
enum Prefix {
    Services,
    ServiceRows,
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_sdk::{test_utils::VMContextBuilder, testing_env};
    use rstest::rstest;
    use vcred_credits_core::CreditsEngine;

    fn account(s: &str) -> AccountId {
        s.parse().unwrap()
    }

    fn setup() -> (CreditsEngine, ServicesEngine, AccountId, AccountId) {
        let mut context = VMContextBuilder::new();
        context.current_account_id(account("vcred.near"));
        testing_env!(context.build());

        let mut credits = CreditsEngine::new(b"c".to_vec(), account("treasury.near")).unwrap();
        let services = ServicesEngine::new(b"s".to_vec());
        let creator = account("creator.near");
        let user1 = account("user1.near");
        credits.set_creator_visibility("x-V", Some(creator.clone()));
        credits
            .buy_credits("x-V", user1.clone(), 50, None, u128::MAX / 2)
            .unwrap();
        (credits, services, creator, user1)
    }

    #[rstest]
    fn happy_path_validate() {
        let (mut credits, mut services, creator, user1) = setup();
        let nonce = services
            .create_service(&creator, &credits, "x-post".into(), "x-V".into(), 10)
            .unwrap();

        let en = services
            .request_service_execution(user1.clone(), &mut credits, nonce, "req".into(), 0)
            .unwrap();

        let key = credits.visibility_key("x-V");
        assert_eq!(credits.get_visibility(&key).unwrap().balance_of(&user1), 40);
        assert_eq!(
            credits
                .get_visibility(&key)
                .unwrap()
                .balance_of(&CURRENT_ACCOUNT_ID),
            10
        );

        services
            .accept_service_execution(&creator, &credits, nonce, en, "ok".into(), 1)
            .unwrap();
        services
            .validate_service_execution(&user1, &mut credits, nonce, en, 2)
            .unwrap();

        let execution = services.get_service_execution(nonce, en).unwrap();
        assert_eq!(execution.state, ExecutionState::Validated);
        assert_eq!(credits.get_visibility(&key).unwrap().balance_of(&creator), 10);
    }

    #[rstest]
    fn auto_validation_after_delay() {
        let (mut credits, mut services, creator, user1) = setup();
        let nonce = services
            .create_service(&creator, &credits, "x-post".into(), "x-V".into(), 10)
            .unwrap();
        let en = services
            .request_service_execution(user1.clone(), &mut credits, nonce, "req".into(), 0)
            .unwrap();
        services
            .accept_service_execution(&creator, &credits, nonce, en, "ok".into(), 1_000)
            .unwrap();

        let stranger = account("stranger.near");
        assert_eq!(
            services.validate_service_execution(&stranger, &mut credits, nonce, en, 1_000 + AUTO_VALIDATION_DELAY_NANOS),
            Err(Error::UnauthorizedExecutionAction)
        );
        services
            .validate_service_execution(&stranger, &mut credits, nonce, en, 1_000 + AUTO_VALIDATION_DELAY_NANOS + 1)
            .unwrap();

        let key = credits.visibility_key("x-V");
        assert_eq!(credits.get_visibility(&key).unwrap().balance_of(&creator), 10);
    }

    #[rstest]
    fn dispute_with_refund() {
        let (mut credits, mut services, creator, user1) = setup();
        let nonce = services
            .create_service(&creator, &credits, "x-post".into(), "x-V".into(), 10)
            .unwrap();
        let en = services
            .request_service_execution(user1.clone(), &mut credits, nonce, "req".into(), 0)
            .unwrap();
        services
            .accept_service_execution(&creator, &credits, nonce, en, "ok".into(), 1)
            .unwrap();
        services
            .dispute_service_execution(&user1, nonce, en, "D".into(), 2)
            .unwrap();

        services
            .resolve_service_execution(&mut credits, nonce, en, true, "refund".into(), 3)
            .unwrap();

        let key = credits.visibility_key("x-V");
        assert_eq!(credits.get_visibility(&key).unwrap().balance_of(&user1), 50);
        let execution = services.get_service_execution(nonce, en).unwrap();
        assert_eq!(execution.state, ExecutionState::Refunded);
    }

    #[rstest]
    fn disabled_service_rejects_request() {
        let (credits, mut services, creator, user1) = setup();
        let nonce = services
            .create_service(&creator, &credits, "x-post".into(), "x-V".into(), 10)
            .unwrap();
        services.update_service(&creator, &credits, nonce, false).unwrap();

        let mut credits = credits;
        assert_eq!(
            services.request_service_execution(user1, &mut credits, nonce, "req".into(), 0),
            Err(Error::DisabledService)
        );
    }
}
