//! In-memory inspection form state and the payload builder.
//!
//! Photos only enter the form through [`InspectionForm::attach_photo`], which
//! runs the [`ImageNormalizer`]; [`InspectionForm::build`] is a pure transform
//! into the wire payload.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{EncodedImage, SubmissionPayload, TyreEntry, VehicleImageEntry, WirePhoto};
use crate::normalizer::ImageNormalizer;
use crate::positions::{PRIME_TYRE_POSITIONS, TRAILER_TYRE_POSITIONS, VEHICLE_IMAGE_POSITIONS};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatterySlot {
    pub number: String,
    photo: Option<EncodedImage>,
}

impl BatterySlot {
    pub fn photo(&self) -> Option<&EncodedImage> {
        self.photo.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdometerReading {
    pub value: String,
    photo: Option<EncodedImage>,
}

impl OdometerReading {
    pub fn photo(&self) -> Option<&EncodedImage> {
        self.photo.as_ref()
    }
}

/// A tyre slot. The position label is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TyreSlot {
    position: &'static str,
    pub number: String,
    photo: Option<EncodedImage>,
}

impl TyreSlot {
    fn new(position: &'static str) -> Self {
        Self {
            position,
            number: String::new(),
            photo: None,
        }
    }

    pub fn position(&self) -> &'static str {
        self.position
    }

    pub fn photo(&self) -> Option<&EncodedImage> {
        self.photo.as_ref()
    }

    pub fn is_filled(&self) -> bool {
        !self.number.trim().is_empty() || self.photo.is_some()
    }

    fn to_entry(&self) -> TyreEntry {
        TyreEntry {
            position: self.position.to_string(),
            number: self.number.trim().to_string(),
            photo_base64: self.photo.clone().map(WirePhoto::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleImageSlot {
    position: &'static str,
    photo: Option<EncodedImage>,
}

impl VehicleImageSlot {
    pub fn position(&self) -> &'static str {
        self.position
    }

    pub fn photo(&self) -> Option<&EncodedImage> {
        self.photo.as_ref()
    }

    pub fn is_filled(&self) -> bool {
        self.photo.is_some()
    }
}

/// Addresses one photo-bearing field of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSlot {
    Battery(usize),
    Odometer,
    PrimeTyre(usize),
    TrailerTyre(usize),
    VehicleImage(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspectionForm {
    pub vehicle_number: String,
    batteries: [BatterySlot; 2],
    pub odometer: OdometerReading,
    prime_tyres: [TyreSlot; 6],
    trailer_tyres: [TyreSlot; 12],
    vehicle_images: [VehicleImageSlot; 4],
    submission_token: String,
}

impl Default for InspectionForm {
    fn default() -> Self {
        Self::new()
    }
}

fn out_of_range(kind: &str, index: usize, len: usize) -> AppError {
    AppError::InvalidInput(format!("{} index {} out of range (0..{})", kind, index, len))
}

impl InspectionForm {
    pub fn new() -> Self {
        Self {
            vehicle_number: String::new(),
            batteries: Default::default(),
            odometer: OdometerReading::default(),
            prime_tyres: std::array::from_fn(|i| TyreSlot::new(PRIME_TYRE_POSITIONS[i])),
            trailer_tyres: std::array::from_fn(|i| TyreSlot::new(TRAILER_TYRE_POSITIONS[i])),
            vehicle_images: std::array::from_fn(|i| VehicleImageSlot {
                position: VEHICLE_IMAGE_POSITIONS[i],
                photo: None,
            }),
            submission_token: Uuid::new_v4().to_string(),
        }
    }

    /// Clears every field and issues a fresh submission token.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Stays the same across retries of one form, so the server can drop duplicates.
    pub fn submission_token(&self) -> &str {
        &self.submission_token
    }

    pub fn batteries(&self) -> &[BatterySlot] {
        &self.batteries
    }

    pub fn prime_tyres(&self) -> &[TyreSlot] {
        &self.prime_tyres
    }

    pub fn trailer_tyres(&self) -> &[TyreSlot] {
        &self.trailer_tyres
    }

    pub fn vehicle_images(&self) -> &[VehicleImageSlot] {
        &self.vehicle_images
    }

    pub fn set_battery_number(
        &mut self,
        index: usize,
        number: impl Into<String>,
    ) -> AppResult<()> {
        let len = self.batteries.len();
        let slot = self
            .batteries
            .get_mut(index)
            .ok_or_else(|| out_of_range("battery", index, len))?;
        slot.number = number.into();
        Ok(())
    }

    pub fn set_prime_tyre_number(
        &mut self,
        index: usize,
        number: impl Into<String>,
    ) -> AppResult<()> {
        let slot = self
            .prime_tyres
            .get_mut(index)
            .ok_or_else(|| out_of_range("prime tyre", index, PRIME_TYRE_POSITIONS.len()))?;
        slot.number = number.into();
        Ok(())
    }

    pub fn set_trailer_tyre_number(
        &mut self,
        index: usize,
        number: impl Into<String>,
    ) -> AppResult<()> {
        let slot = self
            .trailer_tyres
            .get_mut(index)
            .ok_or_else(|| out_of_range("trailer tyre", index, TRAILER_TYRE_POSITIONS.len()))?;
        slot.number = number.into();
        Ok(())
    }

    fn photo_mut(&mut self, slot: PhotoSlot) -> AppResult<&mut Option<EncodedImage>> {
        match slot {
            PhotoSlot::Battery(i) => {
                let len = self.batteries.len();
                self.batteries
                    .get_mut(i)
                    .map(|s| &mut s.photo)
                    .ok_or_else(|| out_of_range("battery", i, len))
            }
            PhotoSlot::Odometer => Ok(&mut self.odometer.photo),
            PhotoSlot::PrimeTyre(i) => self
                .prime_tyres
                .get_mut(i)
                .map(|s| &mut s.photo)
                .ok_or_else(|| out_of_range("prime tyre", i, PRIME_TYRE_POSITIONS.len())),
            PhotoSlot::TrailerTyre(i) => self
                .trailer_tyres
                .get_mut(i)
                .map(|s| &mut s.photo)
                .ok_or_else(|| out_of_range("trailer tyre", i, TRAILER_TYRE_POSITIONS.len())),
            PhotoSlot::VehicleImage(i) => self
                .vehicle_images
                .get_mut(i)
                .map(|s| &mut s.photo)
                .ok_or_else(|| out_of_range("vehicle image", i, VEHICLE_IMAGE_POSITIONS.len())),
        }
    }

    /// Normalizes `raw` and stores it in `slot`. On error the slot is left unchanged.
    pub fn attach_photo(
        &mut self,
        slot: PhotoSlot,
        raw: &[u8],
        normalizer: &ImageNormalizer,
    ) -> AppResult<()> {
        // Resolve the slot first so a bad index never costs a decode.
        self.photo_mut(slot)?;
        let image = normalizer.normalize(raw)?;
        *self.photo_mut(slot)? = Some(image);
        Ok(())
    }

    pub fn clear_photo(&mut self, slot: PhotoSlot) -> AppResult<()> {
        *self.photo_mut(slot)? = None;
        Ok(())
    }

    /// Builds the wire payload. Only filled tyre and vehicle-image slots are emitted.
    pub fn build(&self) -> AppResult<SubmissionPayload> {
        let vehicle_number = self.vehicle_number.trim();
        if vehicle_number.is_empty() {
            return Err(AppError::Validation(
                "vehicle number is required".to_string(),
            ));
        }

        let [battery1, battery2] = &self.batteries;
        Ok(SubmissionPayload {
            vehicle_number: vehicle_number.to_string(),
            battery1_number: battery1.number.trim().to_string(),
            battery1_photo_base64: battery1.photo.clone().map(WirePhoto::from),
            battery2_number: battery2.number.trim().to_string(),
            battery2_photo_base64: battery2.photo.clone().map(WirePhoto::from),
            odometer_value: self.odometer.value.trim().to_string(),
            odometer_photo_base64: self.odometer.photo.clone().map(WirePhoto::from),
            prime_tyres: filled_tyres(&self.prime_tyres),
            trailer_tyres: filled_tyres(&self.trailer_tyres),
            vehicle_images: self
                .vehicle_images
                .iter()
                .filter(|slot| slot.is_filled())
                .map(|slot| VehicleImageEntry {
                    position: slot.position.to_string(),
                    photo_base64: slot.photo.clone().map(WirePhoto::from),
                })
                .collect(),
            submission_token: Some(self.submission_token.clone()),
        })
    }
}

fn filled_tyres(slots: &[TyreSlot]) -> Vec<TyreEntry> {
    slots
        .iter()
        .filter(|slot| slot.is_filled())
        .map(TyreSlot::to_entry)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::png_fixture;

    fn form_for(vehicle: &str) -> InspectionForm {
        let mut form = InspectionForm::new();
        form.vehicle_number = vehicle.to_string();
        form
    }

    #[test]
    fn test_requires_vehicle_number() {
        let form = form_for("   ");
        assert!(matches!(form.build(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_form_emits_singletons_whole() {
        let payload = form_for("HR55AZ3114").build().unwrap();
        assert_eq!(payload.vehicle_number, "HR55AZ3114");
        assert_eq!(payload.battery1_number, "");
        assert_eq!(payload.battery2_number, "");
        assert_eq!(payload.odometer_value, "");
        assert!(payload.battery1_photo_base64.is_none());
        assert!(payload.prime_tyres.is_empty());
        assert!(payload.trailer_tyres.is_empty());
        assert!(payload.vehicle_images.is_empty());
    }

    #[test]
    fn test_every_prime_subset_keeps_labels() {
        for mask in 0u32..(1 << 6) {
            let mut form = form_for("V1");
            for i in 0..6 {
                if mask & (1 << i) != 0 {
                    form.set_prime_tyre_number(i, format!("T{}", i)).unwrap();
                }
            }
            let payload = form.build().unwrap();
            let expected: Vec<(String, String)> = (0..6)
                .filter(|i| mask & (1 << i) != 0)
                .map(|i| (PRIME_TYRE_POSITIONS[i].to_string(), format!("T{}", i)))
                .collect();
            let actual: Vec<(String, String)> = payload
                .prime_tyres
                .iter()
                .map(|t| (t.position.clone(), t.number.clone()))
                .collect();
            assert_eq!(actual, expected, "mask {:06b}", mask);
        }
    }

    #[test]
    fn test_every_trailer_subset_keeps_labels() {
        for mask in 0u32..(1 << 12) {
            let mut form = form_for("V1");
            for i in 0..12 {
                if mask & (1 << i) != 0 {
                    form.set_trailer_tyre_number(i, "X").unwrap();
                }
            }
            let payload = form.build().unwrap();
            assert_eq!(payload.trailer_tyres.len(), mask.count_ones() as usize);
            for tyre in &payload.trailer_tyres {
                let index = TRAILER_TYRE_POSITIONS
                    .iter()
                    .position(|p| *p == tyre.position)
                    .unwrap();
                assert!(mask & (1 << index) != 0);
            }
        }
    }

    #[test]
    fn test_photo_only_slot_counts_as_filled() {
        let normalizer = ImageNormalizer::default();
        let mut form = form_for("V1");
        form.attach_photo(PhotoSlot::TrailerTyre(5), &png_fixture(32, 16), &normalizer)
            .unwrap();
        form.attach_photo(PhotoSlot::VehicleImage(3), &png_fixture(16, 16), &normalizer)
            .unwrap();
        form.set_trailer_tyre_number(0, "   ").unwrap();

        let payload = form.build().unwrap();
        assert_eq!(payload.trailer_tyres.len(), 1);
        assert_eq!(payload.trailer_tyres[0].position, "Axle 2 Left Inner");
        assert_eq!(payload.trailer_tyres[0].number, "");
        assert!(payload.trailer_tyres[0].photo_base64.is_some());
        assert_eq!(payload.vehicle_images.len(), 1);
        assert_eq!(payload.vehicle_images[0].position, "Rear");
    }

    #[test]
    fn test_attach_photo_fails_closed() {
        let normalizer = ImageNormalizer::default();
        let mut form = form_for("V1");
        form.attach_photo(PhotoSlot::Odometer, &png_fixture(8, 8), &normalizer)
            .unwrap();
        let before = form.odometer.photo().cloned();

        let err = form
            .attach_photo(PhotoSlot::Odometer, b"garbage", &normalizer)
            .unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
        assert_eq!(form.odometer.photo().cloned(), before);

        assert!(form
            .attach_photo(PhotoSlot::PrimeTyre(6), &png_fixture(8, 8), &normalizer)
            .is_err());
    }

    #[test]
    fn test_token_stable_until_reset() {
        let mut form = form_for("V1");
        let first = form.build().unwrap().submission_token;
        let second = form.build().unwrap().submission_token;
        assert_eq!(first, second);

        let token = form.submission_token().to_string();
        form.reset();
        assert_ne!(form.submission_token(), token);
        assert!(form.vehicle_number.is_empty());
    }
}
