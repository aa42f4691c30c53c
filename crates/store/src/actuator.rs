use crate::bundle::StoreBundle;
use crate::{Result, StoreError};
use tessera_types::{Account, Address};
use tracing::debug;

/// One validate/execute unit of a transaction's business rules. Actuators
/// run inside an open chainbase session and touch state only through the
/// store views, so an abandoned block candidate rolls their writes back
/// wholesale.
pub trait Actuator {
    fn validate(&self, stores: &StoreBundle) -> Result<()>;

    fn execute(&self, stores: &StoreBundle) -> Result<()>;
}

/// Plain balance transfer.
pub struct TransferActuator {
    pub from: Address,
    pub to: Address,
    pub amount: u64,
}

impl Actuator for TransferActuator {
    fn validate(&self, stores: &StoreBundle) -> Result<()> {
        if self.from == self.to {
            return Err(StoreError::Validation(
                "cannot transfer to the sending account".into(),
            ));
        }
        let sender = stores
            .accounts
            .get(&self.from)?
            .ok_or_else(|| StoreError::Validation("sender account does not exist".into()))?;
        if sender.balance < self.amount {
            return Err(StoreError::Validation(format!(
                "balance {} is less than transfer amount {}",
                sender.balance, self.amount
            )));
        }
        Ok(())
    }

    fn execute(&self, stores: &StoreBundle) -> Result<()> {
        let mut sender = stores
            .accounts
            .get(&self.from)?
            .ok_or_else(|| StoreError::Validation("sender account does not exist".into()))?;
        let mut receiver = stores
            .accounts
            .get(&self.to)?
            .unwrap_or_else(|| Account::new(self.to, 0));

        sender.balance -= self.amount;
        sender.nonce += 1;
        receiver.balance = receiver.balance.saturating_add(self.amount);

        stores.accounts.put(&sender)?;
        stores.accounts.put(&receiver)?;
        debug!(amount = self.amount, "applied transfer");
        Ok(())
    }
}
