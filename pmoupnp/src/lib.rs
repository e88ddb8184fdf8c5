//! # pmoupnp - couche SOAP UPnP
//!
//! Parsing des enveloppes d'action, construction des réponses et des faults,
//! codes d'erreur UPnP.

pub mod soap;
