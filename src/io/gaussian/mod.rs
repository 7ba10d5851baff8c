//! Gaussian output ("log") files.
//!
//! Geometry comes from the last orientation table in the file (standard,
//! input or Z-matrix orientation). Frame properties come from the archive
//! entry at the end of a completed job, the block that starts with `1\1\`
//! and whose fields are separated by backslashes:
//!
//! | Archive field       | Frame column          |
//! |---------------------|-----------------------|
//! | `HF=`               | `energy`              |
//! | `ZeroPoint=`        | `zero_point_energy`   |
//! | `ZPE=`              | `zpe`                 |
//! | `Thermal=`          | `thermal`             |
//! | `RMSD=` / `RMSF=`   | `rmsd` / `rmsf`       |
//! | `Dipole=x,y,z`      | `dipole`              |
//! | `NIMag=`            | `nimag`               |
//!
//! The job title becomes the frame comment and the charge/multiplicity pair
//! preceding it fills `charge` and `multiplicity`. Files without an archive
//! entry still yield their geometry; the property columns stay missing.

mod reader;

pub use reader::read;
