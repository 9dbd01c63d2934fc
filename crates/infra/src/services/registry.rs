//! Organization and invoice records supplied by external collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use scf_core::{Entity, InvoiceId, OrganizationId};
use scf_invoicing::Invoice;
use scf_parties::Organization;

use crate::error::ServiceResult;
use crate::store::LedgerStore;

pub struct Registry<S> {
    store: Arc<S>,
}

impl<S> Clone for Registry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> Registry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn upsert_organization(&self, organization: Organization) -> ServiceResult<OrganizationId> {
        let id = self
            .store
            .transact(|state| Ok(upsert(&mut state.organizations, organization)))?;
        tracing::debug!(organization_id = %id, "organization stored");
        Ok(id)
    }

    pub fn organization(&self, id: OrganizationId) -> ServiceResult<Organization> {
        Ok(self.store.read(|state| state.organization(id).cloned())??)
    }

    /// Organizations sorted by name.
    pub fn organizations(&self) -> ServiceResult<Vec<Organization>> {
        self.store.read(|state| {
            let mut all: Vec<Organization> = state.organizations.values().cloned().collect();
            all.sort_by(|a, b| a.name.cmp(&b.name));
            all
        })
    }

    /// Organizations `id` may earmark limits for.
    pub fn counterparties(&self, id: OrganizationId) -> ServiceResult<Vec<Organization>> {
        Ok(self.store.read(|state| {
            let owner = state.organization(id)?;
            let mut parties: Vec<Organization> = state
                .organizations
                .values()
                .filter(|o| owner.accepts_counterparty(o))
                .cloned()
                .collect();
            parties.sort_by(|a, b| a.name.cmp(&b.name));
            Ok::<_, scf_core::DomainError>(parties)
        })??)
    }

    pub fn upsert_invoice(&self, invoice: Invoice) -> ServiceResult<InvoiceId> {
        let id = self
            .store
            .transact(|state| Ok(upsert(&mut state.invoices, invoice)))?;
        tracing::debug!(invoice_id = %id, "invoice stored");
        Ok(id)
    }

    pub fn invoice(&self, id: InvoiceId) -> ServiceResult<Invoice> {
        Ok(self.store.read(|state| {
            state
                .invoices
                .get(&id)
                .cloned()
                .ok_or_else(|| scf_core::DomainError::not_found(format!("invoice {id}")))
        })??)
    }
}

fn upsert<E: Entity>(records: &mut HashMap<E::Id, E>, record: E) -> E::Id {
    let id = record.id();
    records.insert(id, record);
    id
}
