pub mod modeler;
